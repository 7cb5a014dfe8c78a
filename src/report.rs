//! One-page PDF mood report.
//!
//! Rendering happens in two steps. [`layout`] turns validated [`ReportData`]
//! into a flat list of [`Mark`]s with fixed positions (title, summary block,
//! pie chart). [`to_pdf`] then serializes those marks into a single-page PDF
//! with `lopdf`. The layout never reflows: long lines run off the page and
//! large charts overlap whatever is below them.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

use chrono::Utc;
use lopdf::{
    content::{Content, Operation},
    Dictionary, Document, Object, Stream, StringFormat,
};
use serde_json::{Number, Value};
use thiserror::Error;

// ---

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const INCH: f64 = 72.0;

pub const TITLE: &str = "Mysa AI Mood Analysis Report";

/// Offset of the pie's bounding box inside the chart drawing.
const PIE_OFFSET: (f64, f64) = (50.0, 20.0);
const PIE_SIZE: f64 = 100.0;
const PIE_START_ANGLE: f64 = 90.0;
const LABEL_RADIUS: f64 = 1.2;
const LABEL_SIZE: f64 = 10.0;
const SLICE_BORDER: f64 = 0.5;

/// Keys a report payload must carry.
pub const REQUIRED_KEYS: [&str; 4] = [
    "dominant_mood",
    "total_samples",
    "report_message",
    "pie_chart_data",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Malformed report data: {0}")]
    MalformedInput(String),

    #[error("PDF serialization failed: {0}")]
    Pdf(String),
}

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const DARK_BLUE: Rgb = Rgb(0.0, 0.0, 0.545);
    pub const GREEN: Rgb = Rgb(0.0, 0.502, 0.0);
    pub const ORANGE: Rgb = Rgb(1.0, 0.647, 0.0);
    pub const RED: Rgb = Rgb(1.0, 0.0, 0.0);
    pub const BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
    pub const PURPLE: Rgb = Rgb(0.502, 0.0, 0.502);

    fn operands(self) -> Vec<Object> {
        vec![real(self.0), real(self.1), real(self.2)]
    }
}

/// Slice fill colours, cycled by slice index.
pub const PALETTE: [Rgb; 5] = [Rgb::GREEN, Rgb::ORANGE, Rgb::RED, Rgb::BLUE, Rgb::PURPLE];

/// Standard Type 1 fonts used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }
}

/// One pie slice as read from `pie_chart_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceInput {
    pub label: String,
    pub value: f64,
    /// The value as it should be printed in the slice label.
    pub display: String,
}

/// Validated input for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    // ---
    pub dominant_mood: String,
    pub total_samples: String,
    pub report_message: String,
    pub slices: Vec<SliceInput>,
}

impl TryFrom<&Value> for ReportData {
    type Error = ReportError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        // ---
        let obj = value.as_object().ok_or_else(|| {
            ReportError::MalformedInput("'report_data' must be a JSON object".to_string())
        })?;

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !obj.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::MalformedInput(format!(
                "missing required keys: {}",
                missing.join(", ")
            )));
        }

        let text = |key: &str| -> Result<String, ReportError> {
            match &obj[key] {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(ReportError::MalformedInput(format!(
                    "'{}' must be a string or number, got {}",
                    key, other
                ))),
            }
        };

        let chart = obj["pie_chart_data"].as_object().ok_or_else(|| {
            ReportError::MalformedInput("'pie_chart_data' must be a JSON object".to_string())
        })?;

        let mut slices = Vec::with_capacity(chart.len());
        for (label, pct) in chart {
            let number = match pct {
                Value::Number(n) => n,
                other => {
                    return Err(ReportError::MalformedInput(format!(
                        "percentage for '{}' must be a number, got {}",
                        label, other
                    )))
                }
            };
            let value = number.as_f64().unwrap_or(f64::NAN);
            if !value.is_finite() || value < 0.0 {
                return Err(ReportError::MalformedInput(format!(
                    "percentage for '{}' must be a non-negative number",
                    label
                )));
            }
            slices.push(SliceInput {
                label: label.clone(),
                value,
                display: display_number(number),
            });
        }

        let total: f64 = slices.iter().map(|s| s.value).sum();
        if !total.is_finite() {
            return Err(ReportError::MalformedInput(
                "'pie_chart_data' percentages sum to a non-finite total".to_string(),
            ));
        }

        Ok(ReportData {
            dominant_mood: text("dominant_mood")?,
            total_samples: text("total_samples")?,
            report_message: text("report_message")?,
            slices,
        })
    }
}

/// Print a JSON number the way the tracker shows it: floats keep a decimal
/// point (`60.0`), integers do not (`60`).
fn display_number(number: &Number) -> String {
    // ---
    match number.as_f64() {
        Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e16 => format!("{:.1}", f),
        _ => number.to_string(),
    }
}

/// A positioned drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        font: Font,
        size: f64,
        color: Rgb,
        x: f64,
        y: f64,
        text: String,
    },
    Rule {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
    },
    /// Pie slice swept clockwise from `start` (degrees, counter-clockwise from
    /// the positive x axis) by `sweep` degrees.
    Wedge {
        center: (f64, f64),
        radius: f64,
        start: f64,
        sweep: f64,
        fill: Rgb,
        border: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub marks: Vec<Mark>,
}

impl PageLayout {
    pub fn wedges(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(|m| matches!(m, Mark::Wedge { .. }))
    }
}

/// Place every element of the report on a US Letter page.
pub fn layout(data: &ReportData) -> PageLayout {
    // ---
    let text = |font, size, color, y, text: String| Mark::Text {
        font,
        size,
        color,
        x: INCH,
        y,
        text,
    };

    let mut marks = vec![
        text(
            Font::Bold,
            16.0,
            Rgb::DARK_BLUE,
            PAGE_HEIGHT - 0.75 * INCH,
            TITLE.to_string(),
        ),
        Mark::Rule {
            from: (INCH, PAGE_HEIGHT - 0.9 * INCH),
            to: (PAGE_WIDTH - INCH, PAGE_HEIGHT - 0.9 * INCH),
            width: 1.0,
        },
    ];

    let mut y = PAGE_HEIGHT - 1.5 * INCH;
    marks.push(text(
        Font::Bold,
        14.0,
        Rgb::BLACK,
        y,
        format!("Dominant Expression: {}", data.dominant_mood),
    ));
    y -= 0.3 * INCH;

    marks.push(text(
        Font::Regular,
        12.0,
        Rgb::BLACK,
        y,
        format!("Total Samples Analyzed: {}", data.total_samples),
    ));
    y -= 0.3 * INCH;

    marks.push(text(
        Font::Oblique,
        11.0,
        Rgb::BLACK,
        y,
        format!("Recommendation: {}", data.report_message),
    ));
    y -= 0.5 * INCH;

    marks.push(text(
        Font::Bold,
        12.0,
        Rgb::BLACK,
        y,
        "Mood Distribution:".to_string(),
    ));
    y -= 0.1 * INCH;

    // The chart drawing hangs 3in below the anchor.
    marks.extend(pie_marks(&data.slices, (INCH, y - 3.0 * INCH)));

    PageLayout {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        marks,
    }
}

/// Slices and their labels for a chart drawing whose lower-left is `origin`.
fn pie_marks(slices: &[SliceInput], origin: (f64, f64)) -> Vec<Mark> {
    // ---
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let radius = PIE_SIZE / 2.0;
    let center = (
        origin.0 + PIE_OFFSET.0 + radius,
        origin.1 + PIE_OFFSET.1 + radius,
    );

    let mut wedges = Vec::with_capacity(slices.len());
    let mut labels = Vec::with_capacity(slices.len());
    let mut angle = PIE_START_ANGLE;

    for (i, slice) in slices.iter().enumerate() {
        let sweep = 360.0 * slice.value / total;
        if sweep > 0.0 {
            wedges.push(Mark::Wedge {
                center,
                radius,
                start: angle,
                sweep,
                fill: PALETTE[i % PALETTE.len()],
                border: SLICE_BORDER,
            });
        }

        let mid = (angle - sweep / 2.0).to_radians();
        let label = format!("{}: {}%", slice.label, slice.display);
        let lx = center.0 + LABEL_RADIUS * radius * mid.cos();
        let ly = center.1 + LABEL_RADIUS * radius * mid.sin();
        // Labels on the left half end at the anchor point.
        let x = if mid.cos() < 0.0 {
            lx - text_width(&label, LABEL_SIZE)
        } else {
            lx
        };
        labels.push(Mark::Text {
            font: Font::Regular,
            size: LABEL_SIZE,
            color: Rgb::BLACK,
            x,
            y: ly - 0.35 * LABEL_SIZE,
            text: label,
        });

        angle -= sweep;
    }

    wedges.extend(labels);
    wedges
}

/// Validate `report_data` and render it to PDF bytes.
pub fn render(report_data: &Value) -> Result<Vec<u8>, ReportError> {
    // ---
    let data = ReportData::try_from(report_data)?;
    to_pdf(&layout(&data))
}

/// Serialize a laid-out page into a standalone PDF document.
pub fn to_pdf(page: &PageLayout) -> Result<Vec<u8>, ReportError> {
    // ---
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(font.base_font().as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        fonts.set(font.resource_name(), Object::Reference(font_id));
    }
    let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);

    let content: Content = Content {
        operations: page.marks.iter().flat_map(operations).collect(),
    };
    let encoded = content
        .encode()
        .map_err(|e| ReportError::Pdf(format!("content stream: {}", e)))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                real(page.width),
                real(page.height),
            ]),
        ),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(resources)),
    ]));

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(1)),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let created = Utc::now().format("D:%Y%m%d%H%M%S+00'00'").to_string();
    let info_id = doc.add_object(Dictionary::from_iter(vec![
        ("Title", literal(TITLE.as_bytes().to_vec())),
        ("Producer", literal(b"mysa-mood".to_vec())),
        ("CreationDate", literal(created.into_bytes())),
    ]));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::Pdf(format!("save failed: {}", e)))?;

    Ok(buffer)
}

fn operations(mark: &Mark) -> Vec<Operation> {
    // ---
    match mark {
        Mark::Text {
            font,
            size,
            color,
            x,
            y,
            text,
        } => vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font.resource_name().as_bytes().to_vec()),
                    real(*size),
                ],
            ),
            Operation::new("rg", color.operands()),
            Operation::new("Td", vec![real(*x), real(*y)]),
            Operation::new("Tj", vec![literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ],
        Mark::Rule { from, to, width } => vec![
            Operation::new("q", vec![]),
            Operation::new("RG", Rgb::BLACK.operands()),
            Operation::new("w", vec![real(*width)]),
            Operation::new("m", vec![real(from.0), real(from.1)]),
            Operation::new("l", vec![real(to.0), real(to.1)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
        Mark::Wedge {
            center,
            radius,
            start,
            sweep,
            fill,
            border,
        } => {
            let mut ops = vec![
                Operation::new("q", vec![]),
                Operation::new("rg", fill.operands()),
                Operation::new("RG", Rgb::BLACK.operands()),
                Operation::new("w", vec![real(*border)]),
            ];
            let first = point_on(*center, *radius, *start);
            // A full circle gets no spoke to the centre.
            if *sweep < 360.0 - 1e-9 {
                ops.push(Operation::new("m", vec![real(center.0), real(center.1)]));
                ops.push(Operation::new("l", vec![real(first.0), real(first.1)]));
            } else {
                ops.push(Operation::new("m", vec![real(first.0), real(first.1)]));
            }
            for [c1, c2, end] in arc_segments(*center, *radius, *start, *sweep) {
                ops.push(Operation::new(
                    "c",
                    vec![
                        real(c1.0),
                        real(c1.1),
                        real(c2.0),
                        real(c2.1),
                        real(end.0),
                        real(end.1),
                    ],
                ));
            }
            ops.push(Operation::new("h", vec![]));
            ops.push(Operation::new("B", vec![]));
            ops.push(Operation::new("Q", vec![]));
            ops
        }
    }
}

fn point_on(center: (f64, f64), radius: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (center.0 + radius * rad.cos(), center.1 + radius * rad.sin())
}

/// Cubic Bézier approximation of a clockwise arc, at most 90° per segment.
///
/// Each item is `[control1, control2, end]`; the start point is implied by
/// the previous segment (or by `start` for the first one).
fn arc_segments(
    center: (f64, f64),
    radius: f64,
    start: f64,
    sweep: f64,
) -> Vec<[(f64, f64); 3]> {
    // ---
    let count = (sweep / 90.0).ceil().max(1.0) as usize;
    let step = -sweep / count as f64;
    let k = 4.0 / 3.0 * (step.to_radians() / 4.0).tan();

    let mut segments = Vec::with_capacity(count);
    let mut a0 = start.to_radians();
    for _ in 0..count {
        let a1 = a0 + step.to_radians();
        let p0 = (center.0 + radius * a0.cos(), center.1 + radius * a0.sin());
        let p3 = (center.0 + radius * a1.cos(), center.1 + radius * a1.sin());
        let c1 = (p0.0 - k * radius * a0.sin(), p0.1 + k * radius * a0.cos());
        let c2 = (p3.0 + k * radius * a1.sin(), p3.1 - k * radius * a1.cos());
        segments.push([c1, c2, p3]);
        a0 = a1;
    }
    segments
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn literal(bytes: Vec<u8>) -> Object {
    Object::String(bytes, StringFormat::Literal)
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    // ---
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Helvetica advance widths (1/1000 em) for printable ASCII, from the AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Width of `text` set in Helvetica at `size` points.
fn text_width(text: &str, size: f64) -> f64 {
    // ---
    let units: u32 = encode_text(text)
        .iter()
        .map(|&b| match b {
            b' '..=b'~' => HELVETICA_WIDTHS[(b - b' ') as usize] as u32,
            _ => 556,
        })
        .sum();
    units as f64 * size / 1000.0
}
