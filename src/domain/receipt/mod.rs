//! Receipt rendering.
//!
//! `render` is pure: the same record and branding always produce the same
//! bytes. Two formats are supported, the HTML email body and a printable
//! single-page PDF.

mod html;
mod pdf;

pub use html::escape_html;
pub use pdf::{wrap_text, PdfFont, PdfPage, MAX_LINE_CHARS};

use crate::domain::donation::DonationRecord;
use crate::domain::foundation::format_amount;

/// Output format of a rendered receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptFormat {
    Html,
    Pdf,
}

impl ReceiptFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReceiptFormat::Html => "text/html; charset=utf-8",
            ReceiptFormat::Pdf => "application/pdf",
        }
    }
}

/// Organisation details printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptBranding {
    pub ministry_name: String,
    pub campaign_title: String,
    /// Base for download links, without a trailing slash.
    pub public_base_url: String,
}

impl ReceiptBranding {
    /// Link that lets the donor fetch their PDF without logging in.
    ///
    /// `None` when the record has no receipt token.
    pub fn download_url(&self, record: &DonationRecord) -> Option<String> {
        let token = record.receipt_token.as_ref()?;
        Some(format!(
            "{}/api/receipt?ref={}&t={}",
            self.public_base_url.trim_end_matches('/'),
            encode_query_value(record.reference.as_str()),
            encode_query_value(token.as_str()),
        ))
    }

    /// Subject line for the receipt email.
    pub fn email_subject(&self) -> String {
        format!("Donation Receipt - {}", self.ministry_name)
    }
}

/// Renders `record` in the requested format.
pub fn render(record: &DonationRecord, format: ReceiptFormat, branding: &ReceiptBranding) -> Vec<u8> {
    let lines = ReceiptLines::new(record, branding);
    match format {
        ReceiptFormat::Html => html::render_html(&lines).into_bytes(),
        ReceiptFormat::Pdf => render_pdf(&lines),
    }
}

/// Download filename for a record's PDF receipt.
pub fn receipt_filename(record: &DonationRecord) -> String {
    format!("Receipt_{}.pdf", record.reference.file_stem())
}

/// Display values shared by both formats.
struct ReceiptLines {
    ministry_name: String,
    campaign_title: String,
    donor_name: String,
    donor_email: Option<String>,
    amount_text: String,
    provider: String,
    date_text: String,
    reference: String,
    download_url: Option<String>,
}

impl ReceiptLines {
    fn new(record: &DonationRecord, branding: &ReceiptBranding) -> Self {
        Self {
            ministry_name: branding.ministry_name.clone(),
            campaign_title: branding.campaign_title.clone(),
            donor_name: record.donor_name.clone(),
            donor_email: record.donor_email.clone(),
            amount_text: format_amount(&record.currency, record.amount_minor_units),
            provider: record.provider.as_str().to_uppercase(),
            date_text: record.created_at.receipt_date(),
            reference: record.reference.as_str().to_string(),
            download_url: branding.download_url(record),
        }
    }
}

const LEFT_MARGIN: f32 = 50.0;
const ROW_HEIGHT: f32 = 22.0;
const BLACK: f32 = 0.0;
const GRAY: f32 = 0.27;

/// Characters of the 20 pt header that fit on one line.
const HEADER_LINE_CHARS: usize = 44;

fn render_pdf(lines: &ReceiptLines) -> Vec<u8> {
    let mut page = PdfPage::new();
    let mut y = 780.0;
    for line in wrap_text(&lines.ministry_name, HEADER_LINE_CHARS) {
        page.text(PdfFont::Bold, 20.0, LEFT_MARGIN, y, BLACK, line);
        y -= 24.0;
    }
    page.text(PdfFont::Regular, 12.0, LEFT_MARGIN, y, GRAY, "Donation Receipt");
    y -= 40.0;

    let mut rows = vec![
        format!("Campaign: {}", lines.campaign_title),
        format!("Donor Name: {}", lines.donor_name),
    ];
    if let Some(email) = &lines.donor_email {
        rows.push(format!("Email: {}", email));
    }
    rows.push(format!("Amount: {}", lines.amount_text));
    rows.push(format!("Provider: {}", lines.provider));
    rows.push(format!("Date: {}", lines.date_text));
    rows.push(format!("Reference: {}", lines.reference));

    for row in rows {
        for line in wrap_text(&row, MAX_LINE_CHARS) {
            page.text(PdfFont::Regular, 12.0, LEFT_MARGIN, y, BLACK, line);
            y -= ROW_HEIGHT;
        }
    }

    y -= ROW_HEIGHT;
    page.text(PdfFont::Regular, 12.0, LEFT_MARGIN, y, GRAY, "Thank you for your donation")
        .text(PdfFont::Regular, 12.0, LEFT_MARGIN, y - ROW_HEIGHT, GRAY, "God bless you,");
    let signature_y = y - 2.0 * ROW_HEIGHT;
    for (index, line) in wrap_text(&lines.ministry_name, MAX_LINE_CHARS).into_iter().enumerate() {
        let line_y = signature_y - index as f32 * ROW_HEIGHT;
        page.text(PdfFont::Bold, 12.0, LEFT_MARGIN, line_y, GRAY, line);
    }

    page.finish()
}

/// Percent-encodes a query value, keeping RFC 3986 unreserved characters.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::donation::{DonationEvent, DonationProvider, ReceiptToken};
    use crate::domain::foundation::{Currency, DonationReference, MinorUnits, Timestamp};

    fn branding() -> ReceiptBranding {
        ReceiptBranding {
            ministry_name: "Life Gate Ministries Worldwide".to_string(),
            campaign_title: "Life Gate Ministries Campaign".to_string(),
            public_base_url: "https://give.example.org/".to_string(),
        }
    }

    fn record(name: &str, reference: &str) -> DonationRecord {
        let event = DonationEvent {
            provider: DonationProvider::CardGateway,
            amount_minor_units: MinorUnits::new(500_000),
            currency: Currency::parse("ngn").unwrap(),
            donor_name: name.to_string(),
            donor_email: Some("jane@x.com".to_string()),
            reference: DonationReference::new(reference).unwrap(),
        };
        DonationRecord::from_event(
            &event,
            ReceiptToken::from_stored("ab".repeat(24)),
            Timestamp::now(),
        )
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    // ══════════════════════════════════════════════════════════════
    // HTML
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn html_contains_donor_amount_and_link() {
        let html = String::from_utf8(render(
            &record("Jane Doe", "cs_test_1"),
            ReceiptFormat::Html,
            &branding(),
        ))
        .unwrap();

        assert!(html.contains("Jane Doe"));
        assert!(html.contains("NGN 5,000.00"));
        assert!(html.contains("STRIPE"));
        assert!(html.contains(&format!(
            "https://give.example.org/api/receipt?ref=cs_test_1&amp;t={}",
            "ab".repeat(24)
        )));
    }

    #[test]
    fn html_escapes_donor_name_and_reference() {
        let html = String::from_utf8(render(
            &record("<script>alert(1)</script>", "ref<b>"),
            ReceiptFormat::Html,
            &branding(),
        ))
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("ref&lt;b&gt;"));
    }

    #[test]
    fn render_is_deterministic() {
        let record = record("Jane Doe", "cs_test_1");
        assert_eq!(
            render(&record, ReceiptFormat::Pdf, &branding()),
            render(&record, ReceiptFormat::Pdf, &branding())
        );
    }

    // ══════════════════════════════════════════════════════════════
    // PDF
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn pdf_contains_receipt_rows() {
        let pdf = render(&record("Jane Doe", "cs_test_1"), ReceiptFormat::Pdf, &branding());

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(contains(&pdf, "Life Gate Ministries Worldwide"));
        assert!(contains(&pdf, "Donation Receipt"));
        assert!(contains(&pdf, "Donor Name: Jane Doe"));
        assert!(contains(&pdf, "Email: jane@x.com"));
        assert!(contains(&pdf, "Amount: NGN 5,000.00"));
        assert!(contains(&pdf, "Provider: STRIPE"));
        assert!(contains(&pdf, "Reference: cs_test_1"));
    }

    #[test]
    fn pdf_wraps_long_reference_within_page() {
        let reference = "r".repeat(150);

        let pdf = render(&record("Jane Doe", &reference), ReceiptFormat::Pdf, &branding());

        assert!(contains(&pdf, "(Reference:) Tj"));
        assert!(contains(&pdf, &format!("({}) Tj", "r".repeat(MAX_LINE_CHARS))));
        assert!(contains(&pdf, &format!("({}) Tj", "r".repeat(150 - MAX_LINE_CHARS))));
        assert!(!contains(&pdf, &"r".repeat(MAX_LINE_CHARS + 1)));
    }

    #[test]
    fn pdf_omits_email_row_when_absent() {
        let mut record = record("Jane Doe", "cs_test_1");
        record.donor_email = None;

        let pdf = render(&record, ReceiptFormat::Pdf, &branding());

        assert!(!contains(&pdf, "Email:"));
    }

    // ══════════════════════════════════════════════════════════════
    // Links and filenames
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn download_url_encodes_reference() {
        let url = branding()
            .download_url(&record("Jane", "ref with/slash"))
            .unwrap();
        assert!(url.starts_with("https://give.example.org/api/receipt?ref=ref%20with%2Fslash&t="));
    }

    #[test]
    fn download_url_requires_token() {
        let mut record = record("Jane", "cs_1");
        record.receipt_token = None;
        assert!(branding().download_url(&record).is_none());
    }

    #[test]
    fn filename_is_sanitised() {
        assert_eq!(
            receipt_filename(&record("Jane", "cs/test\"1")),
            "Receipt_cs_test_1.pdf"
        );
    }
}
