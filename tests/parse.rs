use biblio_assistant::biblio::{clean, parse, parse_prediction, Classification, ParseError};
use proptest::prelude::*;

#[test]
fn prose_reply_is_rejected() {
    let err = parse("not json at all").unwrap_err();
    assert!(matches!(err, ParseError::Json(_)));
}

#[test]
fn fenced_reply_with_newlines_decodes() {
    let raw = "```json\n{\n  \"País\": \"Brasil\",\n  \"Classificação\": 1\n}\n```";
    assert_eq!(clean(raw), "{  \"País\": \"Brasil\",  \"Classificação\": 1}");
    let object = parse(raw).unwrap();
    assert_eq!(object["País"], "Brasil");
    assert_eq!(object["Classificação"], 1);
}

#[test]
fn python_style_example_answer_is_not_json() {
    let raw = "{'Objeto de Análise': 'Prática educacional', 'Classificação': 4}";
    assert!(matches!(parse(raw), Err(ParseError::Json(_))));
}

#[test]
fn array_reply_is_not_an_object() {
    let err = parse("[1, 2]").unwrap_err();
    assert!(matches!(err, ParseError::NotAnObject("an array")));
}

#[test]
fn spaced_policy_key_is_accepted() {
    let prediction = parse_prediction(
        r#"{"Objeto de Análise": "Formação de professores", "Metodologia": "Não Especificado",
            "Escala de Análise": "Não Especificado", "País": "Australia",
            "Política/ prática": "Prática", "Classificação": "3"}"#,
    )
    .unwrap();
    assert_eq!(prediction.policy_or_practice, "Prática");
    assert_eq!(prediction.country, "Australia");
    assert_eq!(prediction.classification, Classification::new(3).unwrap());
}

#[test]
fn missing_text_fields_default_to_empty() {
    let prediction = parse_prediction(r#"{"Classificação": 2, "País": null}"#).unwrap();
    assert_eq!(prediction.object_of_analysis, "");
    assert_eq!(prediction.country, "");
    assert_eq!(prediction.classification.get(), 2);
}

#[test]
fn list_values_are_joined() {
    let prediction =
        parse_prediction(r#"{"Classificação": 1, "Metodologia": ["Entrevistas", "Survey"]}"#)
            .unwrap();
    assert_eq!(prediction.methodology, "Entrevistas; Survey");
}

#[test]
fn out_of_range_classification_is_rejected() {
    let err = parse_prediction(r#"{"Classificação": 7}"#).unwrap_err();
    assert!(matches!(err, ParseError::Classification(_)));
    let err = parse_prediction(r#"{"País": "Chile"}"#).unwrap_err();
    assert!(matches!(err, ParseError::Field(_)));
}

proptest! {
    #[test]
    fn parse_is_idempotent_on_clean_json(
        object in prop::collection::btree_map("[a-zA-Z ]{1,12}", "[a-zA-Z0-9 .,]{0,24}", 0..6)
    ) {
        let text = serde_json::to_string(&object).unwrap();
        prop_assume!(!text.contains("json"));
        let direct = parse(&text).unwrap();
        let recleaned = parse(&clean(&text)).unwrap();
        prop_assert_eq!(&direct, &recleaned);
        prop_assert_eq!(direct.len(), object.len());
    }
}
