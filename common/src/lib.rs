use validator::ValidationErrors;

/// Joins every validation message into one `; `-separated line, in field-name order.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(_, errs)| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name cannot be empty"))]
        name: String,
        #[validate(range(min = 1, message = "count must be positive"))]
        count: i64,
    }

    #[test]
    fn joins_messages_in_field_order() {
        let errors = Sample {
            name: String::new(),
            count: 0,
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            format_validation_errors(&errors),
            "count must be positive; name cannot be empty"
        );
    }
}
