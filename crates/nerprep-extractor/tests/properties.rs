//! Property tests for markup offsets, span classification and relation maps

use std::collections::BTreeSet;

use nerprep_core::{Doc, Example, GapPolicy, Span};
use nerprep_extractor::markup::parse_inline_entities;
use nerprep_extractor::reconcile::classify_spans;
use nerprep_extractor::relation::{EntityPair, RelationMap};
use proptest::prelude::*;

fn slice(text: &str, (start, end): (usize, usize)) -> String {
    text.chars().skip(start).take(end - start).collect()
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Zé]{1,6}", 0..4).prop_map(|w| w.join(" "))
}

/// One optional single-token label per token
fn unit_spans(len: usize) -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec(prop::option::of(prop::sample::select(vec!["A", "B"])), len)
        .prop_map(|labels| {
            labels
                .into_iter()
                .enumerate()
                .filter_map(|(i, label)| label.map(|l| Span::new(i, i + 1, l)))
                .collect()
        })
}

fn text_of(len: usize) -> String {
    (0..len).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

fn doc(text: &str, ents: Vec<Span>) -> Doc {
    let mut doc = Doc::from_text(text);
    doc.set_ents(ents, GapPolicy::Outside).unwrap();
    doc
}

fn case() -> impl Strategy<Value = (usize, Vec<Span>, Vec<Span>)> {
    (1usize..8).prop_flat_map(|len| (Just(len), unit_spans(len), unit_spans(len)))
}

fn as_set(spans: &[Span]) -> BTreeSet<(usize, usize, String)> {
    spans
        .iter()
        .map(|s| (s.start, s.end, s.label.clone()))
        .collect()
}

proptest! {
    #[test]
    fn markup_offsets_index_entity_text(
        before in words(),
        e1 in "[a-zA-Z]{1,8}",
        middle in words(),
        e2 in "[a-zA-Z]{1,8}",
        after in words(),
    ) {
        let sentence = format!("{before} <e1>{e1}</e1> {middle} <e2>{e2}</e2> {after}");
        let parsed = parse_inline_entities(&sentence).unwrap();

        prop_assert_eq!(slice(&parsed.text, parsed.e1), e1);
        prop_assert_eq!(slice(&parsed.text, parsed.e2), e2);
        prop_assert!(!parsed.text.contains('<'));
    }

    #[test]
    fn classification_partitions_spans((len, predicted, gold) in case()) {
        let text = text_of(len);
        let example = Example::new(doc(&text, predicted.clone()), doc(&text, gold.clone())).unwrap();
        let c = classify_spans(&example);

        let correct = as_set(&c.correct);
        let incorrect = as_set(&c.incorrect);
        let missing = as_set(&c.missing);

        prop_assert!(correct.is_disjoint(&incorrect));
        prop_assert!(correct.is_disjoint(&missing));

        let predicted_back: BTreeSet<_> = correct.union(&incorrect).cloned().collect();
        prop_assert_eq!(predicted_back, as_set(&predicted));

        let gold_back: BTreeSet<_> = correct.union(&missing).cloned().collect();
        prop_assert_eq!(gold_back, as_set(&gold));
    }

    #[test]
    fn classification_is_deterministic((len, predicted, gold) in case()) {
        let text = text_of(len);
        let example = Example::new(doc(&text, predicted), doc(&text, gold)).unwrap();
        prop_assert_eq!(classify_spans(&example), classify_spans(&example));
    }

    #[test]
    fn gold_against_itself_is_exact((len, _predicted, gold) in case()) {
        let text = text_of(len);
        let example = Example::new(doc(&text, gold.clone()), doc(&text, gold)).unwrap();
        let c = classify_spans(&example);
        prop_assert!(c.is_exact());
    }

    #[test]
    fn backfill_makes_every_pair_dense(
        entries in prop::collection::vec(
            ((0usize..4, 0usize..4), prop::sample::select(vec!["Cause-Effect", "Other", "Member-Collection"])),
            1..10,
        )
    ) {
        let mut rels = RelationMap::new();
        let mut pairs = BTreeSet::new();
        for ((head, tail), label) in &entries {
            let pair = EntityPair::new(*head, *tail);
            rels.set(pair, *label, 1.0);
            pairs.insert(pair);
            pairs.insert(pair.reversed());
        }
        let labels = rels.labels_seen();
        rels.backfill(pairs.iter().copied(), &labels);

        for pair in &pairs {
            let row = rels.labels(*pair).unwrap();
            prop_assert_eq!(row.len(), labels.len());
        }
        for ((head, tail), label) in &entries {
            prop_assert_eq!(rels.get(EntityPair::new(*head, *tail), label), Some(1.0));
        }
    }
}
