//! Same-name propagation across a realistic run of finder candidates.

use curator::domain::{Annotation, FinderOutput, Occurrence};
use curator::engine::{set_annotation_with_edge, CurationPolicy, OccurrenceCollection};

fn occ(name: &str, score: f64, annotation: Annotation) -> Occurrence {
    Occurrence::new(name, "Uninomial", score, 0, name.chars().count()).with_annotation(annotation)
}

/// Twelve candidates: two low-score names, three scored "Venus" and a
/// repeat of the first name at the end
fn molluscs() -> OccurrenceCollection {
    use Annotation::*;
    let names = vec![
        occ("Gastropoda", 0.0, NotAssigned),
        occ("Amphineura", 0.0, NotAssigned),
        occ("Scaphopoda", 0.0, NotAssigned),
        occ("Pelecypoda", 0.0, NotAssigned),
        occ("Cephalopoda", 0.0, NotAssigned),
        occ("Octopus", 37.21, Doubtful),
        occ("Miiricea muricata", 0.0, NotAssigned),
        occ("Venus", 16.35, Doubtful),
        occ("Venus", 16.35, Doubtful),
        occ("Venus", 16.35, Doubtful),
        occ("Mollusca", 0.0, NotAssigned),
        occ("Gastropoda", 0.0, NotAssigned),
    ];
    OccurrenceCollection::new(FinderOutput::from_occurrences(names)).unwrap()
}

fn annotate_at(
    coll: &mut OccurrenceCollection,
    index: usize,
    annotation: Annotation,
    edge: usize,
    policy: &CurationPolicy,
) {
    coll.seek(index).unwrap();
    set_annotation_with_edge(coll, annotation, edge, policy).unwrap();
}

fn annotations(coll: &OccurrenceCollection) -> Vec<Annotation> {
    coll.occurrences().iter().map(|o| o.annotation).collect()
}

#[test]
fn test_rejection_spreads_to_later_duplicates() {
    let policy = CurationPolicy::default();
    let mut coll = molluscs();

    for index in 0..=6 {
        annotate_at(&mut coll, index, Annotation::Accepted, 7, &policy);
    }
    annotate_at(&mut coll, 7, Annotation::NotName, 7, &policy);

    let got = annotations(&coll);
    assert_eq!(got[7], Annotation::NotName);
    assert_eq!(got[8], Annotation::NotName);
    assert_eq!(got[9], Annotation::NotName);
    assert_eq!(got[10], Annotation::NotAssigned);
    // Index 0 was accepted far behind the edge, so its twin is untouched
    assert_eq!(got[11], Annotation::NotAssigned);
}

#[test]
fn test_redeciding_reverts_doubtful_duplicates() {
    let policy = CurationPolicy::default();
    let mut coll = molluscs();

    for index in 0..=6 {
        annotate_at(&mut coll, index, Annotation::Accepted, 7, &policy);
    }
    annotate_at(&mut coll, 7, Annotation::NotName, 7, &policy);
    annotate_at(&mut coll, 8, Annotation::Accepted, 8, &policy);

    let got = annotations(&coll);
    assert_eq!(got[7], Annotation::NotName);
    assert_eq!(got[8], Annotation::Accepted);
    assert_eq!(got[9], Annotation::Doubtful);
    assert_eq!(got[10], Annotation::NotAssigned);
}

#[test]
fn test_reversal_at_first_occurrence() {
    let policy = CurationPolicy::default();
    let mut coll = molluscs();

    annotate_at(&mut coll, 0, Annotation::Accepted, 0, &policy);
    assert_eq!(coll.occurrences()[11].annotation, Annotation::Accepted);
    assert_eq!(coll.occurrences()[10].annotation, Annotation::NotAssigned);

    annotate_at(&mut coll, 0, Annotation::NotName, 0, &policy);
    assert_eq!(coll.occurrences()[0].annotation, Annotation::NotName);
    assert_eq!(coll.occurrences()[11].annotation, Annotation::NotAssigned);
    assert_eq!(coll.occurrences()[10].annotation, Annotation::NotAssigned);
}

#[test]
fn test_modifications_never_propagate() {
    let policy = CurationPolicy::default();
    let mut coll = molluscs();

    annotate_at(&mut coll, 7, Annotation::Genus, 7, &policy);

    let got = annotations(&coll);
    assert_eq!(got[7], Annotation::Genus);
    assert_eq!(got[8], Annotation::Doubtful);
    assert_eq!(got[9], Annotation::Doubtful);
}

#[test]
fn test_lookback_is_configurable() {
    let policy = CurationPolicy {
        lookback: 0,
        ..Default::default()
    };
    let mut coll = molluscs();

    // One position behind the edge: outside a zero look-back
    annotate_at(&mut coll, 7, Annotation::NotName, 8, &policy);

    let got = annotations(&coll);
    assert_eq!(got[7], Annotation::NotName);
    assert_eq!(got[8], Annotation::Doubtful);
    assert_eq!(got[9], Annotation::Doubtful);
}
