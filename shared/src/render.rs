use crate::core::Order;

/// Both representations submitted upstream. Computed once per request from
/// the normalized order; rendering the same order twice yields identical
/// output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

pub fn render_order(order: &Order) -> RenderedEmail {
    RenderedEmail {
        html: render_html(order),
        text: order
            .text_body
            .clone()
            .unwrap_or_else(|| render_text(order)),
    }
}

/// Every user-supplied string passes through here before being
/// interpolated into HTML. No other escaping path exists.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// US-locale currency: `$` + thousands separators + exactly two decimals.
/// Non-finite amounts render as `$0.00`.
pub fn format_usd(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn core_cell(core_charge: f64) -> String {
    if core_charge == 0.0 {
        "-".to_string()
    } else {
        format_usd(core_charge)
    }
}

fn join_present(parts: &[&String]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_text(order: &Order) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(order.subject.clone());
    lines.push(String::new());

    lines.push("Part | Description | Qty | Unit | Core | Line".to_string());
    for item in &order.items {
        let quantity = item.quantity.to_string();
        let unit = format_usd(item.price);
        let core = core_cell(item.core_charge);
        let line = format_usd(item.price * f64::from(item.quantity));
        lines.push(
            [
                item.part_number.as_str(),
                item.description.as_str(),
                quantity.as_str(),
                unit.as_str(),
                core.as_str(),
                line.as_str(),
            ]
            .join(" | "),
        );
    }
    lines.push(String::new());

    lines.push(format!("Subtotal: {}", format_usd(order.totals.subtotal)));
    if order.totals.core_total != 0.0 {
        lines.push(format!("Core Total: {}", format_usd(order.totals.core_total)));
    }
    lines.push(String::new());

    let customer = &order.customer;
    lines.push(
        [
            customer.name.as_str(),
            customer.email.as_str(),
            customer.phone.as_str(),
        ]
        .join(" | "),
    );
    if !customer.company.is_empty() {
        lines.push(format!("Company: {}", customer.company));
    }
    if !customer.address1.is_empty() {
        lines.push(customer.address1.clone());
    }
    if !customer.address2.is_empty() {
        lines.push(customer.address2.clone());
    }
    let locality = join_present(&[
        &customer.city,
        &customer.state,
        &customer.zip,
        &customer.country,
    ]);
    if !locality.is_empty() {
        lines.push(locality);
    }
    if !customer.instructions.is_empty() {
        lines.push(format!("Instructions: {}", customer.instructions));
    }

    if let Some(payment) = &order.payment {
        lines.push(match &payment.note {
            Some(note) => format!("Payment: {} ({})", payment.method, note),
            None => format!("Payment: {}", payment.method),
        });
    }

    lines.join("\n")
}

const CELL_STYLE: &str = "border:1px solid #ccc;padding:6px 8px;text-align:left";

fn render_html(order: &Order) -> String {
    let mut html = String::new();

    html.push_str("<div style=\"font-family:Arial,Helvetica,sans-serif;font-size:14px;color:#222\">");
    html.push_str(&format!(
        "<h2 style=\"margin:0 0 12px\">{}</h2>",
        escape_html(&order.subject)
    ));

    html.push_str("<table style=\"border-collapse:collapse;width:100%\"><tr>");
    for heading in ["Part", "Description", "Qty", "Unit", "Core", "Line"] {
        html.push_str(&format!(
            "<th style=\"{CELL_STYLE};background:#f4f4f4\">{heading}</th>"
        ));
    }
    html.push_str("</tr>");
    for item in &order.items {
        html.push_str("<tr>");
        html.push_str(&format!(
            "<td style=\"{CELL_STYLE}\">{}</td>",
            escape_html(&item.part_number)
        ));
        html.push_str(&format!(
            "<td style=\"{CELL_STYLE}\">{}</td>",
            escape_html(&item.description)
        ));
        html.push_str(&format!("<td style=\"{CELL_STYLE}\">{}</td>", item.quantity));
        html.push_str(&format!(
            "<td style=\"{CELL_STYLE}\">{}</td>",
            format_usd(item.price)
        ));
        html.push_str(&format!(
            "<td style=\"{CELL_STYLE}\">{}</td>",
            core_cell(item.core_charge)
        ));
        html.push_str(&format!(
            "<td style=\"{CELL_STYLE}\">{}</td>",
            format_usd(item.price * f64::from(item.quantity))
        ));
        html.push_str("</tr>");
    }
    html.push_str("</table>");

    html.push_str(&format!(
        "<p style=\"margin:12px 0 0\"><strong>Subtotal: {}</strong>",
        format_usd(order.totals.subtotal)
    ));
    if order.totals.core_total != 0.0 {
        html.push_str(&format!(
            "<br/>Core Total: {}",
            format_usd(order.totals.core_total)
        ));
    }
    html.push_str("</p>");

    let customer = &order.customer;
    html.push_str("<h3 style=\"margin:16px 0 4px\">Customer</h3><p style=\"margin:0\">");
    let mut customer_lines: Vec<String> = Vec::new();
    for value in [&customer.name, &customer.email, &customer.phone] {
        if !value.is_empty() {
            customer_lines.push(escape_html(value));
        }
    }
    if !customer.company.is_empty() {
        customer_lines.push(escape_html(&customer.company));
    }
    if !customer.address1.is_empty() {
        customer_lines.push(escape_html(&customer.address1));
    }
    if !customer.address2.is_empty() {
        customer_lines.push(escape_html(&customer.address2));
    }
    let locality = join_present(&[&customer.city, &customer.state, &customer.zip]);
    if !locality.is_empty() {
        customer_lines.push(escape_html(&locality));
    }
    if !customer.country.is_empty() {
        customer_lines.push(escape_html(&customer.country));
    }
    html.push_str(&customer_lines.join("<br/>"));
    html.push_str("</p>");

    if !customer.instructions.is_empty() {
        html.push_str(&format!(
            "<p style=\"margin:8px 0 0\">Instructions: {}</p>",
            escape_html(&customer.instructions)
        ));
    }

    if let Some(payment) = &order.payment {
        let line = match &payment.note {
            Some(note) => format!("{} ({})", escape_html(&payment.method), escape_html(note)),
            None => escape_html(&payment.method),
        };
        html.push_str(&format!("<p style=\"margin:8px 0 0\">Payment: {line}</p>"));
    }

    html.push_str("</div>");
    html
}
