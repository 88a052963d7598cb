//! `{}` slot templates used by catalog entries.

use crate::constants::TEMPLATE_SLOT;
use crate::error::{IntakeError, IntakeResult};

/// Counts the `{}` slots in a template.
pub fn placeholder_count(template: &str) -> usize {
    template.matches(TEMPLATE_SLOT).count()
}

/// Fills each `{}` slot in order with the matching value.
///
/// # Errors
///
/// Returns `IntakeError::TemplateSlotMismatch` if the number of values differs from the
/// number of slots. A template is never rendered with an unfilled or surplus slot.
pub fn fill_template(name: &str, template: &str, values: &[String]) -> IntakeResult<String> {
    let found = placeholder_count(template);
    if found != values.len() {
        return Err(IntakeError::TemplateSlotMismatch {
            template: name.to_owned(),
            expected: values.len(),
            found,
        });
    }

    let mut out = String::with_capacity(template.len());
    let mut parts = template.split(TEMPLATE_SLOT);
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for (part, value) in parts.zip(values) {
        out.push_str(value);
        out.push_str(part);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_count() {
        assert_eq!(placeholder_count("Bed alarm on"), 0);
        assert_eq!(placeholder_count("Assessed {}"), 1);
        assert_eq!(placeholder_count("Last {}; next {}"), 2);
    }

    #[test]
    fn test_fill_template_in_order() {
        let filled = fill_template(
            "Chemotherapy regimen",
            "Last cycle completed {}; next cycle scheduled {}",
            &["03/01/2026".into(), "03/29/2026".into()],
        )
        .unwrap();
        assert_eq!(
            filled,
            "Last cycle completed 03/01/2026; next cycle scheduled 03/29/2026"
        );
        assert_eq!(fill_template("plain", "No slots", &[]).unwrap(), "No slots");
    }

    #[test]
    fn test_fill_template_rejects_mismatch() {
        let err = fill_template("Wound care", "Changed {}, next {}", &["x".into()]).unwrap_err();
        assert!(matches!(
            err,
            IntakeError::TemplateSlotMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }
}
