//! Minimal single-page PDF writer.
//!
//! Produces an uncompressed PDF 1.4 file with one A4 page and the two
//! standard Helvetica faces, which every viewer ships. Text is WinAnsi
//! encoded; characters outside Latin-1, and the C1 range WinAnsi reassigns,
//! are replaced with `?`. Text is not measured, so callers wrap long lines
//! with [`wrap_text`].

use std::fmt::Write as _;

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 842.0;

/// Characters of 12 pt Helvetica that fit between 50 pt margins.
pub const MAX_LINE_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    Regular,
    Bold,
}

impl PdfFont {
    fn resource_name(&self) -> &'static str {
        match self {
            PdfFont::Regular => "F1",
            PdfFont::Bold => "F2",
        }
    }
}

/// One positioned line of text.
#[derive(Debug, Clone)]
struct TextRun {
    font: PdfFont,
    size: f32,
    x: f32,
    y: f32,
    gray: f32,
    text: String,
}

/// Builder for a one-page text document.
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    runs: Vec<TextRun>,
}

impl PdfPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `text` with its baseline at (`x`, `y`), origin bottom-left.
    /// `gray` is 0.0 for black through 1.0 for white.
    pub fn text(
        &mut self,
        font: PdfFont,
        size: f32,
        x: f32,
        y: f32,
        gray: f32,
        text: impl Into<String>,
    ) -> &mut Self {
        self.runs.push(TextRun {
            font,
            size,
            x,
            y,
            gray,
            text: text.into(),
        });
        self
    }

    /// Serializes the page into a complete PDF file.
    pub fn finish(&self) -> Vec<u8> {
        let content = self.content_stream();

        let mut objects: Vec<Vec<u8>> = Vec::with_capacity(6);
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        objects.push(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec());
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>",
                A4_WIDTH, A4_HEIGHT
            )
            .into_bytes(),
        );

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);

        objects.push(font_object("Helvetica"));
        objects.push(font_object("Helvetica-Bold"));

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in &offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }

    fn content_stream(&self) -> Vec<u8> {
        let mut content = Vec::new();
        for run in &self.runs {
            content.extend_from_slice(
                format!(
                    "BT {:.2} g /{} {} Tf {} {} Td (",
                    run.gray,
                    run.font.resource_name(),
                    run.size,
                    run.x,
                    run.y
                )
                .as_bytes(),
            );
            content.extend_from_slice(&encode_text(&run.text));
            content.extend_from_slice(b") Tj ET\n");
        }
        content
    }
}

fn font_object(base_font: &str) -> Vec<u8> {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base_font
    )
    .into_bytes()
}

/// Splits `text` into lines of at most `max_chars` characters, breaking at
/// whitespace where possible and inside words that are too long on their own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(chars.drain(..max_chars).collect());
        }
        if chars.is_empty() {
            continue;
        }
        if current_len > 0 && current_len + 1 + chars.len() > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Escapes a string for a PDF literal and encodes it as Latin-1.
fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                bytes.push(b'\\');
                bytes.push(ch as u8);
            }
            '\n' | '\r' | '\t' => bytes.push(b' '),
            c if (c as u32) < 0x20 => {}
            c if (0x80..=0x9F).contains(&(c as u32)) => bytes.push(b'?'),
            c if (c as u32) <= 0xFF => bytes.push(c as u32 as u8),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}
