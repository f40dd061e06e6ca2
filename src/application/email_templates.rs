/// Renders the passcode email. Returns `(subject, html)`.
pub fn otp_email(to_name: &str, code: &str, company_name: &str, ttl_minutes: i64) -> (String, String) {
    let subject = format!("Your {company_name} check-in code");
    let headline = format!("Hi {}, here is your check-in code", escape_html(to_name));
    let lead = format!(
        "Enter this code on the check-in screen to sign in. It expires in {ttl_minutes} minutes."
    );
    let body = code_block(code);
    let reason = format!("someone requested to sign in to {company_name} with this address");

    let html = wrap_email(
        company_name,
        &headline,
        &lead,
        &body,
        &reason,
        Some("Each code works once. Request a new one if it has expired."),
    );
    (subject, html)
}

fn code_block(code: &str) -> String {
    format!(
        r#"<div style="margin:16px 0;padding:14px 18px;background-color:#f3f4f6;border-radius:8px;font-size:28px;letter-spacing:0.3em;font-weight:700;color:#111827;text-align:center;">{code}</div>"#
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn wrap_email(
    company_name: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
    footer_note: Option<&str>,
) -> String {
    let reason_label = "Why you got this email";
    let ignore_line = "If you didn't request this, you can safely ignore it.";

    let footer_note = footer_note
        .map(|note| {
            format!(
                r#"<p style="margin:8px 0 0;color:#4b5563;font-size:13px;">{}</p>"#,
                note
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{company} - Office check-in</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0 0 6px;font-size:13px;color:#4b5563;">{reason_label}: {reason}.</p>
        <p style="margin:0;font-size:13px;color:#4b5563;">{ignore_line}</p>
        {footer_note}
      </div>
    </div>
  </body>
</html>
"#,
        company = escape_html(company_name),
        headline = headline,
        lead = lead,
        body_html = body_html,
        reason = escape_html(reason),
        reason_label = reason_label,
        ignore_line = ignore_line,
        footer_note = footer_note,
    )
}
