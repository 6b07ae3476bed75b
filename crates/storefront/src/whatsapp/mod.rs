//! WhatsApp wishlist inquiries.
//!
//! A shopper sends their wishlist to the store as a pre-filled WhatsApp
//! message: the contact form is validated, the message is rendered from
//! `templates/whatsapp/inquiry.txt`, and the result is returned as a
//! `https://wa.me/<phone>?text=<message>` deep link.

mod form;

use askama::Template;
use chrono::NaiveDate;
use cozy_furniture_core::Product;
use rust_decimal::Decimal;

pub use form::{ContactDetails, ContactForm, ContactFormError};

/// WhatsApp click-to-chat base URL.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

// =============================================================================
// Phone Numbers
// =============================================================================

/// Whether `phone` has a plausible number of digits (10 to 15), ignoring
/// punctuation.
#[must_use]
pub fn is_valid_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

/// Reduce `phone` to the digits-only form WhatsApp expects.
///
/// Ten-digit numbers are assumed to be North American and get the `1`
/// country code. Returns `None` for numbers with too few or too many digits.
#[must_use]
pub fn normalize_phone_number(phone: &str) -> Option<String> {
    if !is_valid_phone_number(phone) {
        return None;
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == MIN_PHONE_DIGITS {
        Some(format!("1{digits}"))
    } else {
        Some(digits)
    }
}

/// Click-to-chat link opening a chat with `phone` pre-filled with `message`.
///
/// Without a phone number WhatsApp asks the user to pick a contact.
#[must_use]
pub fn deep_link(phone: Option<&str>, message: &str) -> String {
    format!(
        "{WHATSAPP_BASE_URL}{}?text={}",
        phone.unwrap_or_default(),
        urlencoding::encode(message)
    )
}

// =============================================================================
// Message
// =============================================================================

#[derive(Template)]
#[template(path = "whatsapp/inquiry.txt")]
struct InquiryTemplate<'a> {
    contact: &'a ContactDetails,
    date: String,
    items: Vec<InquiryLine<'a>>,
    total: String,
}

struct InquiryLine<'a> {
    name: &'a str,
    /// Price with the saving appended when discounted.
    price: String,
    /// `W"W × H"H × D"D`, or empty without dimensions.
    size: String,
    colors: String,
    in_stock: bool,
}

impl<'a> InquiryLine<'a> {
    fn new(product: &'a Product) -> Self {
        let mut price = format_amount(product.price);
        if let Some(saving) = product.discount() {
            price.push_str(&format!(" (Save {})", format_amount(saving)));
        }

        let size = product.dimensions.map_or_else(String::new, |d| {
            format!(
                "{}\"W × {}\"H × {}\"D",
                d.width.normalize(),
                d.height.normalize(),
                d.depth.normalize()
            )
        });

        let colors = product
            .colors
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            name: &product.name,
            price,
            size,
            colors,
            in_stock: product.in_stock,
        }
    }
}

/// Render the inquiry message for `products`, dated `date`.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn format_inquiry(
    products: &[&Product],
    contact: &ContactDetails,
    date: NaiveDate,
) -> Result<String, askama::Error> {
    let total = products.iter().map(|p| p.price).sum::<Decimal>();

    InquiryTemplate {
        contact,
        date: date.format("%-m/%-d/%Y").to_string(),
        items: products.iter().map(|p| InquiryLine::new(p)).collect(),
        total: format_amount(total),
    }
    .render()
}

/// Dollar amount with thousands separators; cents only when non-zero.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = if rounded.fract().is_zero() {
        rounded.trunc().normalize().to_string()
    } else {
        format!("{rounded:.2}")
    };

    let (sign, unsigned) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |rest| ("-", rest));
    let (whole, cents) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(w, c)| (w, Some(c)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match cents {
        Some(cents) => format!("{sign}${grouped}.{cents}"),
        None => format!("{sign}${grouped}"),
    }
}
