use super::*;
use serde_json::json;

fn sample() -> serde_json::Value {
    json!({
        "project": "iHeart",
        "question": "Approval status of iHeart",
        "status": "OK",
        "answer_short": "- Phase 1 approved on 2023-11-05 [Approvals p.2]",
        "citations": [{
            "pack": "Approvals",
            "file": "ApprovalsPack.pdf",
            "page": 2,
            "quote": "Final approval for phase 1 was granted by the 'City Planning Commission' on 2023-11-05."
        }],
        "extracted_fields": {
            "doc_type": "Approval",
            "doc_number": null,
            "doc_date": "2023-11-05",
            "issuing_authority": "City Planning Commission",
            "survey_or_extent": null
        },
        "notes": ""
    })
}

#[test]
fn deserializes_upstream_shape() {
    let record: AnswerRecord = serde_json::from_value(sample()).unwrap();
    assert_eq!(record.status, AnswerStatus::Ok);
    assert_eq!(record.citations.len(), 1);
    assert_eq!(record.citations[0].page, 2);
    assert_eq!(record.extracted_fields.doc_date.as_deref(), Some("2023-11-05"));
    assert!(record.validate().is_ok());
}

#[test]
fn serializes_back_to_same_json() {
    let record: AnswerRecord = serde_json::from_value(sample()).unwrap();
    assert_eq!(serde_json::to_value(&record).unwrap(), sample());
}

#[test]
fn optional_fields_may_be_absent() {
    let record: AnswerRecord = serde_json::from_value(json!({
        "project": "iHeart",
        "question": "q",
        "status": "NOT_FOUND",
        "answer_short": "Nothing found.",
        "citations": [],
        "extracted_fields": { "doc_type": "unknown" },
        "notes": "Upload the Title pack."
    }))
    .unwrap();
    assert_eq!(record.status, AnswerStatus::NotFound);
    assert!(record.extracted_fields.present().is_empty());
    assert!(record.validate().is_ok());
}

#[test]
fn missing_required_field_fails() {
    let mut value = sample();
    value.as_object_mut().unwrap().remove("notes");
    assert!(serde_json::from_value::<AnswerRecord>(value).is_err());
}

#[test]
fn unknown_status_fails() {
    let mut value = sample();
    value["status"] = json!("MAYBE");
    assert!(serde_json::from_value::<AnswerRecord>(value).is_err());
}

#[test]
fn not_found_with_citations_is_a_violation() {
    let mut value = sample();
    value["status"] = json!("NOT_FOUND");
    let record: AnswerRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.validate(), Err(RecordViolation::CitationsOnNotFound(1)));
}

#[test]
fn overlong_quotes_are_reported() {
    let mut record: AnswerRecord = serde_json::from_value(sample()).unwrap();
    assert!(record.overlong_quotes().is_empty());
    record.citations[0].quote = vec!["word"; 41].join(" ");
    assert_eq!(record.overlong_quotes().len(), 1);
}

#[test]
fn present_fields_keep_schema_order() {
    let record: AnswerRecord = serde_json::from_value(sample()).unwrap();
    assert_eq!(
        record.extracted_fields.present(),
        vec![("Doc date", "2023-11-05"), ("Issuing authority", "City Planning Commission")]
    );
}

#[test]
fn status_labels() {
    assert_eq!(AnswerStatus::Ok.as_str(), "OK");
    assert_eq!(AnswerStatus::NotFound.as_str(), "NOT_FOUND");
    assert_eq!(AnswerStatus::Ambiguous.as_str(), "AMBIGUOUS");
}
