//! Text extraction — every distinct Korean string a subject's pages can speak.
//!
//! Pure functions, no I/O. The result is the indexing basis for filenames, so
//! its order must depend on text content alone.

use std::collections::BTreeSet;

use crate::record::SubjectRecord;

/// Collect the unique, non-empty texts of a record, sorted ascending.
///
/// Which fields count:
/// - review items, numbers, nouns: `kr`
/// - verbs: `kr` and `polite`, as separate entries
/// - sentences: `kr`, plus each entry of `blocks` on its own
/// - picture quiz: `sentence.kr`
pub fn extract_texts(record: &SubjectRecord) -> Vec<String> {
    let mut texts = BTreeSet::new();

    let primaries = record
        .review
        .iter()
        .chain(&record.numbers)
        .chain(&record.nouns)
        .map(|item| item.kr.as_deref());
    for text in primaries {
        insert(&mut texts, text);
    }

    for verb in &record.verbs {
        insert(&mut texts, verb.kr.as_deref());
        insert(&mut texts, verb.polite.as_deref());
    }

    for sentence in &record.sentences {
        insert(&mut texts, sentence.kr.as_deref());
        for block in &sentence.blocks {
            insert(&mut texts, Some(block));
        }
    }

    for quiz in &record.picture_quiz {
        insert(&mut texts, quiz.sentence.as_ref().and_then(|s| s.kr.as_deref()));
    }

    // BTreeSet iterates in byte order, which for UTF-8 is code point order.
    texts.into_iter().collect()
}

fn insert(texts: &mut BTreeSet<String>, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        texts.insert(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> SubjectRecord {
        SubjectRecord::from_json(json).unwrap()
    }

    // ── single categories ───────────────────────────────────────────

    #[test]
    fn numbers_sorted() {
        let texts = extract_texts(&record(r#"{"numbers": [{"kr": "하나"}, {"kr": "둘"}]}"#));
        assert_eq!(texts, vec!["둘", "하나"]);
    }

    #[test]
    fn verbs_contribute_both_forms() {
        let texts = extract_texts(&record(
            r#"{"verbs": [{"kr": "가다", "polite": "가요"}, {"kr": "오다"}]}"#,
        ));
        assert_eq!(texts, vec!["가다", "가요", "오다"]);
    }

    #[test]
    fn sentence_blocks_are_separate_entries() {
        let texts = extract_texts(&record(
            r#"{"sentences": [{"kr": "물을 마셔요", "blocks": ["물을", "마셔요"]}]}"#,
        ));
        assert_eq!(texts, vec!["마셔요", "물을", "물을 마셔요"]);
    }

    #[test]
    fn picture_quiz_uses_nested_sentence() {
        let texts = extract_texts(&record(
            r#"{"pictureQuiz": [{"sentence": {"kr": "강아지예요"}}, {"answer": 1}]}"#,
        ));
        assert_eq!(texts, vec!["강아지예요"]);
    }

    #[test]
    fn review_and_nouns() {
        let texts = extract_texts(&record(
            r#"{"review": [{"kr": "네"}], "nouns": [{"kr": "우유"}]}"#,
        ));
        assert_eq!(texts, vec!["네", "우유"]);
    }

    // ── edge cases ──────────────────────────────────────────────────

    #[test]
    fn empty_record() {
        assert!(extract_texts(&SubjectRecord::default()).is_empty());
    }

    #[test]
    fn empty_and_absent_fields_skipped() {
        let texts = extract_texts(&record(
            r#"{
                "numbers": [{"kr": ""}, {}],
                "verbs": [{"kr": "", "polite": ""}],
                "sentences": [{"blocks": ["", "빵"]}],
                "pictureQuiz": [{"sentence": {"kr": ""}}, {"sentence": {}}]
            }"#,
        ));
        assert_eq!(texts, vec!["빵"]);
    }

    #[test]
    fn duplicates_across_categories_collapse() {
        let texts = extract_texts(&record(
            r#"{
                "nouns": [{"kr": "사과"}],
                "review": [{"kr": "사과"}],
                "sentences": [{"kr": "사과", "blocks": ["사과"]}],
                "pictureQuiz": [{"sentence": {"kr": "사과"}}]
            }"#,
        ));
        assert_eq!(texts, vec!["사과"]);
    }

    #[test]
    fn order_independent_of_category_layout() {
        let a = extract_texts(&record(
            r#"{"numbers": [{"kr": "셋"}], "nouns": [{"kr": "가방"}, {"kr": "책"}]}"#,
        ));
        let b = extract_texts(&record(
            r#"{"nouns": [{"kr": "책"}], "review": [{"kr": "가방"}], "verbs": [{"kr": "셋"}]}"#,
        ));
        assert_eq!(a, b);
    }

    #[test]
    fn output_is_exactly_the_input_fields() {
        let texts = extract_texts(&record(
            r#"{
                "review": [{"kr": "a"}],
                "numbers": [{"kr": "b"}],
                "verbs": [{"kr": "c", "polite": "d"}],
                "nouns": [{"kr": "e"}],
                "sentences": [{"kr": "f", "blocks": ["g", "h"]}],
                "pictureQuiz": [{"sentence": {"kr": "i"}}]
            }"#,
        ));
        assert_eq!(texts, vec!["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
    }

    #[test]
    fn no_duplicates_or_empties() {
        let texts = extract_texts(&record(
            r#"{"sentences": [
                {"kr": "x y", "blocks": ["x", "y", "x", ""]},
                {"kr": "x y", "blocks": ["y"]}
            ]}"#,
        ));
        let mut deduped = texts.clone();
        deduped.dedup();
        assert_eq!(texts, deduped);
        assert!(texts.iter().all(|t| !t.is_empty()));
        assert!(texts.windows(2).all(|w| w[0] < w[1]));
    }
}
