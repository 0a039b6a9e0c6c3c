use crate::error::{MalformedTagData, TimetableError};
use crate::models::TimetableEvent;
use crate::validation::{validate_input_string, MAX_TAGS, MAX_TAG_LEN};

/// Splits a comma-separated tag query, trimming entries and dropping empties.
pub fn parse_tag_query(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// Tags live in a text column as a JSON array
pub fn encode_tags(tags: &[String]) -> Result<String, TimetableError> {
    if tags.len() > MAX_TAGS {
        return Err(TimetableError::InvalidInput(format!(
            "Too many tags (max {})",
            MAX_TAGS
        )));
    }

    for tag in tags {
        validate_input_string(tag, Some(MAX_TAG_LEN))
            .map_err(|msg| TimetableError::InvalidInput(format!("Invalid tag: {}", msg)))?;
    }

    serde_json::to_string(tags)
        .map_err(|err| TimetableError::InvalidInput(format!("Invalid tags: {}", err)))
}

/// An empty column counts as no tags.
pub fn decode_tags(raw: &str) -> Result<Vec<String>, MalformedTagData> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<String>>(raw).map_err(|err| MalformedTagData(err.to_string()))
}

/// Keeps the events whose tags include every requested tag, preserving order.
pub fn filter_by_tags(events: Vec<TimetableEvent>, required: &[String]) -> Vec<TimetableEvent> {
    if required.is_empty() {
        return events;
    }

    events
        .into_iter()
        .filter(|event| match decode_tags(&event.tags) {
            Ok(tags) => required.iter().all(|t| tags.contains(t)),
            Err(err) => {
                log::debug!("Event {} excluded from tag filter: {}", event.id, err);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn event_with_tags(title: &str, tags: &str) -> TimetableEvent {
        TimetableEvent {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            location: None,
            start_at: Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 2, 10, 13, 0, 0).unwrap(),
            all_day: false,
            tags: tags.to_string(),
            visibility: Visibility::Public,
            owner_id: Uuid::nil(),
        }
    }

    fn titles(events: &[TimetableEvent]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_parse_tag_query() {
        assert_eq!(parse_tag_query(" UTFR, Midterm ,,"), vec!["UTFR", "Midterm"]);
        assert!(parse_tag_query("").is_empty());
        assert!(parse_tag_query(" , ,").is_empty());
    }

    #[test]
    fn test_filter_requires_all_tags() {
        let events = vec![
            event_with_tags("both", r#"["Gym","Swim"]"#),
            event_with_tags("gym only", r#"["Gym"]"#),
            event_with_tags("superset", r#"["Swim","Gym","Yoga"]"#),
        ];
        let required = parse_tag_query("Gym,Swim");
        let filtered = filter_by_tags(events, &required);
        assert_eq!(titles(&filtered), vec!["both", "superset"]);
    }

    #[test]
    fn test_filter_with_no_tags_is_identity() {
        let events = vec![
            event_with_tags("a", "not json"),
            event_with_tags("b", r#"["Gym"]"#),
        ];
        let filtered = filter_by_tags(events.clone(), &[]);
        assert_eq!(filtered, events);
    }

    #[test]
    fn test_malformed_tags_are_excluded() {
        let events = vec![
            event_with_tags("broken", "[\"Gym\""),
            event_with_tags("object", r#"{"Gym":true}"#),
            event_with_tags("numbers", "[1,2]"),
            event_with_tags("ok", r#"["Gym"]"#),
        ];
        let filtered = filter_by_tags(events, &["Gym".to_string()]);
        assert_eq!(titles(&filtered), vec!["ok"]);
    }

    #[test]
    fn test_tag_match_is_case_sensitive() {
        let events = vec![event_with_tags("gym", r#"["gym"]"#)];
        assert!(filter_by_tags(events, &["Gym".to_string()]).is_empty());
    }

    #[test]
    fn test_decode_empty_column() {
        assert!(decode_tags("").unwrap().is_empty());
        assert!(decode_tags("[]").unwrap().is_empty());
    }

    #[test]
    fn test_encode_validates_on_write() {
        let encoded = encode_tags(&["Gym".to_string(), "Swim".to_string()]).unwrap();
        assert_eq!(encoded, r#"["Gym","Swim"]"#);
        assert_eq!(encode_tags(&[]).unwrap(), "[]");

        let bad = encode_tags(&["ok".to_string(), "bad\0".to_string()]);
        assert!(matches!(bad, Err(TimetableError::InvalidInput(_))));

        let too_many: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{}", i)).collect();
        assert!(encode_tags(&too_many).is_err());
    }
}
