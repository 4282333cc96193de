use std::fmt;

use cuid2::CuidConstructor;
use serde::Deserialize;
use serde_json::Value;

#[cfg(any(test, feature = "mocks"))]
use mockall::automock;

/// Inbound checkout payload, exactly as the storefront posts it.
///
/// Everything is optional at this layer. Quantities and amounts are kept as
/// raw JSON values because storefront builds have shipped them as numbers
/// and as strings; [`Order::from_submission`] coerces them in one place
/// instead of failing the whole parse.
#[derive(Debug, Default, Deserialize)]
pub struct OrderSubmission {
    pub subject: Option<String>,
    pub items: Option<Vec<LineItemSubmission>>,
    pub totals: Option<TotalsSubmission>,
    pub customer: Option<CustomerSubmission>,
    pub payment: Option<PaymentSubmission>,
    #[serde(rename = "textBody")]
    pub text_body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LineItemSubmission {
    pub part_number: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
    pub core_charge: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalsSubmission {
    pub subtotal: Option<Value>,
    #[serde(rename = "coreTotal")]
    pub core_total: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentSubmission {
    pub method: Option<String>,
    pub note: Option<String>,
}

/// A fully-defaulted order. Every field downstream of normalization is
/// guaranteed present: quantities are ≥ 1, amounts are finite, strings are
/// empty rather than absent. Nothing mutates an `Order` after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub subject: String,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub customer: Customer,
    pub payment: Option<Payment>,
    pub text_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub part_number: String,
    pub description: String,
    pub quantity: u32,
    pub price: f64,
    pub core_charge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub subtotal: f64,
    pub core_total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub method: String,
    pub note: Option<String>,
}

/// The required fields a submission failed to provide.
#[derive(Debug, PartialEq)]
pub struct ValidationError {
    missing: Vec<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required field(s): {}", self.missing.join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl Order {
    /// Single normalization step from the raw submission.
    ///
    /// `subject` must be a non-empty string and `items` a non-empty array;
    /// everything else defaults. No outbound call happens before this
    /// succeeds.
    pub fn from_submission(submission: OrderSubmission) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();

        let subject = submission.subject.unwrap_or_default();
        if subject.is_empty() {
            missing.push("subject");
        }

        let raw_items = submission.items.unwrap_or_default();
        if raw_items.is_empty() {
            missing.push("items");
        }

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        let items = raw_items.into_iter().map(LineItem::from_submission).collect();

        let totals = submission
            .totals
            .map(|totals| Totals {
                subtotal: coerce_amount(totals.subtotal.as_ref()),
                core_total: coerce_amount(totals.core_total.as_ref()),
            })
            .unwrap_or_default();

        let customer = submission
            .customer
            .map(Customer::from_submission)
            .unwrap_or_default();

        let payment = submission.payment.and_then(|payment| {
            let method = payment.method.unwrap_or_default();
            if method.is_empty() {
                return None;
            }
            Some(Payment {
                method,
                note: payment.note.filter(|note| !note.is_empty()),
            })
        });

        Ok(Self {
            subject,
            items,
            totals,
            customer,
            payment,
            text_body: submission.text_body.filter(|text| !text.is_empty()),
        })
    }
}

impl LineItem {
    fn from_submission(item: LineItemSubmission) -> Self {
        Self {
            part_number: item.part_number.unwrap_or_default(),
            description: item.description.unwrap_or_default(),
            quantity: coerce_quantity(item.quantity.as_ref()),
            price: coerce_amount(item.price.as_ref()),
            core_charge: coerce_amount(item.core_charge.as_ref()),
        }
    }
}

impl Customer {
    fn from_submission(customer: CustomerSubmission) -> Self {
        Self {
            name: customer.name.unwrap_or_default(),
            email: customer.email.unwrap_or_default(),
            phone: customer.phone.unwrap_or_default(),
            company: customer.company.unwrap_or_default(),
            address1: customer.address1.unwrap_or_default(),
            address2: customer.address2.unwrap_or_default(),
            city: customer.city.unwrap_or_default(),
            state: customer.state.unwrap_or_default(),
            zip: customer.zip.unwrap_or_default(),
            country: customer.country.unwrap_or_default(),
            instructions: customer.instructions.unwrap_or_default(),
        }
    }
}

fn coerce_amount(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

fn coerce_quantity(value: Option<&Value>) -> u32 {
    let quantity = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(1.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(1.0),
        _ => 1.0,
    };
    if quantity.is_finite() && quantity >= 1.0 {
        quantity as u32
    } else {
        1
    }
}

/// What gets handed to the mailer: the validated subject plus both rendered
/// bodies, with the reply-to address already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
pub trait IdGenerator {
    fn generate_id(&self) -> String;
}

pub struct CuidGenerator {
    gen: CuidConstructor,
}

impl CuidGenerator {
    pub fn new() -> Self {
        Self {
            gen: CuidConstructor::new().with_length(10),
        }
    }
}

impl Default for CuidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for CuidGenerator {
    fn generate_id(&self) -> String {
        // Correlation token for logs and confirmation replies, not a
        // globally unique identifier.
        self.gen.create_id().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn submission_from(value: serde_json::Value) -> OrderSubmission {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn when_subject_and_items_are_missing_should_name_both() {
        let result = Order::from_submission(submission_from(json!({})));

        let error = result.unwrap_err();
        assert_eq!(
            error.to_string(),
            "missing required field(s): subject, items"
        );
    }

    #[test]
    fn when_items_is_empty_should_reject() {
        let result = Order::from_submission(submission_from(json!({
            "subject": "Order #77",
            "items": []
        })));

        assert_eq!(
            result.unwrap_err().to_string(),
            "missing required field(s): items"
        );
    }

    #[test]
    fn when_quantity_is_missing_zero_negative_or_garbage_should_clamp_to_one() {
        let order = Order::from_submission(submission_from(json!({
            "subject": "Order #1",
            "items": [
                { "part_number": "A" },
                { "part_number": "B", "quantity": 0 },
                { "part_number": "C", "quantity": -4 },
                { "part_number": "D", "quantity": "lots" },
                { "part_number": "E", "quantity": "3" }
            ]
        })))
        .unwrap();

        let quantities: Vec<u32> = order.items.iter().map(|item| item.quantity).collect();
        assert_eq!(quantities, vec![1, 1, 1, 1, 3]);
    }

    #[test]
    fn when_amounts_are_missing_or_garbage_should_default_to_zero() {
        let order = Order::from_submission(submission_from(json!({
            "subject": "Order #1",
            "items": [
                { "price": "not a price", "core_charge": null },
                { "price": "12.50", "core_charge": 3 }
            ],
            "totals": { "subtotal": "abc" }
        })))
        .unwrap();

        assert_eq!(order.items[0].price, 0.0);
        assert_eq!(order.items[0].core_charge, 0.0);
        assert_eq!(order.items[1].price, 12.5);
        assert_eq!(order.items[1].core_charge, 3.0);
        assert_eq!(order.totals.subtotal, 0.0);
        assert_eq!(order.totals.core_total, 0.0);
    }

    #[test]
    fn when_optional_sections_are_absent_should_default_everything() {
        let order = Order::from_submission(submission_from(json!({
            "subject": "Order #2",
            "items": [{ "part_number": "X-1" }]
        })))
        .unwrap();

        assert_eq!(order.customer, Customer::default());
        assert_eq!(order.totals, Totals::default());
        assert!(order.payment.is_none());
        assert!(order.text_body.is_none());
    }

    #[test]
    fn when_payment_has_no_method_should_drop_payment() {
        let order = Order::from_submission(submission_from(json!({
            "subject": "Order #3",
            "items": [{}],
            "payment": { "note": "call first" }
        })))
        .unwrap();

        assert!(order.payment.is_none());
    }

    #[test]
    fn when_payment_has_method_should_keep_optional_note() {
        let order = Order::from_submission(submission_from(json!({
            "subject": "Order #3",
            "items": [{}],
            "payment": { "method": "Net 30", "note": "PO 4411" }
        })))
        .unwrap();

        let payment = order.payment.unwrap();
        assert_eq!(payment.method, "Net 30");
        assert_eq!(payment.note.as_deref(), Some("PO 4411"));
    }

    #[test]
    fn generated_ids_are_uppercase_alphanumeric_and_short() {
        let generator = CuidGenerator::new();

        let id = generator.generate_id();

        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_ne!(id, generator.generate_id());
    }
}
