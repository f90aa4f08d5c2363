//! HTML receipt body for the donor email.

use super::ReceiptLines;

/// Escapes the five HTML-special characters.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(super) fn render_html(lines: &ReceiptLines) -> String {
    let mut rows = String::new();
    push_row(&mut rows, "Donor Name", &lines.donor_name, "font-weight:700;");
    push_row(&mut rows, "Campaign", &lines.campaign_title, "font-weight:600;");
    if let Some(email) = &lines.donor_email {
        push_row(&mut rows, "Email", email, "");
    }
    push_row(
        &mut rows,
        "Amount",
        &lines.amount_text,
        "font-weight:800;color:#1a472a;font-size:16px;",
    );
    push_row(&mut rows, "Provider", &lines.provider, "font-weight:600;");
    push_row(&mut rows, "Date", &lines.date_text, "");
    push_row(
        &mut rows,
        "Reference",
        &lines.reference,
        "font-family:Consolas,monospace;word-break:break-all;",
    );

    let download = match &lines.download_url {
        Some(url) => format!(
            r#"<p style="margin:18px 0 0 0;"><a href="{url}" style="display:inline-block;background:#1a472a;color:#ffffff;padding:10px 18px;border-radius:8px;text-decoration:none;font-weight:700;">Download your receipt (PDF)</a></p>"#,
            url = escape_html(url)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Donation Receipt</title></head>
<body style="margin:0;background:#f6f7f9;">
<div style="padding:24px;font-family:Arial,Helvetica,sans-serif;">
  <div style="max-width:640px;margin:0 auto;background:#ffffff;border-radius:14px;overflow:hidden;border:1px solid #e8e8e8;">
    <div style="background:#0f1419;padding:26px 24px;">
      <div style="font-size:22px;font-weight:800;color:#d4af37;">{ministry}</div>
      <div style="margin-top:6px;font-size:13px;color:#d9d9d9;">Donation Receipt</div>
    </div>
    <div style="padding:22px 24px;color:#111;">
      <h2 style="margin:0 0 10px 0;font-size:18px;color:#1a472a;">Thank you for your donation</h2>
      <p style="font-size:13px;color:#444;line-height:1.6;">Your generosity helps us transform lives. Below is your receipt for this donation.</p>
      <table style="width:100%;border-collapse:collapse;font-size:14px;">
{rows}      </table>
      {download}
      <p style="margin-top:18px;font-size:14px;">God bless you,<br/><strong style="color:#1a472a;">{ministry}</strong></p>
    </div>
  </div>
</div>
</body>
</html>"#,
        ministry = escape_html(&lines.ministry_name),
        rows = rows,
        download = download,
    )
}

fn push_row(out: &mut String, label: &str, value: &str, value_style: &str) {
    out.push_str(&format!(
        "        <tr><td style=\"padding:8px 0;color:#555;width:160px;\">{}</td><td style=\"padding:8px 0;{}\">{}</td></tr>\n",
        label,
        value_style,
        escape_html(value)
    ));
}
