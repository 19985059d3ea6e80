use qabot_core::Error;
use qabot_text::Analyzer;
use qabot_vector::sparse::l2_norm;
use qabot_vector::VectorSpaceModel;

const QUESTIONS: &[&str] = &[
    "what is the internship period",
    "company name",
    "organization name",
    "how many assignments",
    "face detection challenge",
    "ocr preprocessing",
    "websocket filtering",
];

fn fit() -> VectorSpaceModel {
    VectorSpaceModel::fit(Analyzer::english(), QUESTIONS)
}

#[test]
fn shape_matches_corpus_and_vocabulary() {
    let model = fit();
    assert_eq!(model.len(), QUESTIONS.len());
    assert_eq!(model.idf().len(), model.vocabulary().len());
    assert!(model.vocabulary().windows(2).all(|w| w[0] < w[1]), "vocabulary sorted");
    assert!(model.column("internship period").is_some(), "bigrams are in the vocabulary");
    assert!(model.column("name").is_none(), "stop words are excluded");
}

#[test]
fn rows_are_unit_length() {
    let model = fit();
    for row in model.rows() {
        assert!((l2_norm(row) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn rarer_terms_weigh_more() {
    let model = VectorSpaceModel::fit(Analyzer::english(), &["socket alpha", "socket beta", "socket gamma"]);
    let socket = model.column("socket").unwrap();
    let alpha = model.column("alpha").unwrap();
    assert!(model.idf()[alpha] > model.idf()[socket]);
}

#[test]
fn identical_text_scores_one() {
    let model = fit();
    let scores = model.scores("ocr preprocessing");
    assert!((scores[5] - 1.0).abs() < 1e-9);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
}

#[test]
fn out_of_vocabulary_query_scores_zero() {
    let model = fit();
    assert!(model.scores("zebra quantum").iter().all(|s| *s == 0.0));
    assert!(model.project("the of and").is_empty());
}

#[test]
fn query_projection_ignores_unknown_terms() {
    let model = fit();
    let scores = model.scores("what organization did you intern at");
    assert!((scores[2] - 1.0).abs() < 1e-9, "only 'organization' is in vocabulary");
    assert_eq!(scores[1], 0.0);
}

#[test]
fn fit_is_deterministic() {
    assert_eq!(fit(), fit());
}

#[test]
fn from_parts_round_trips_a_fit_model() {
    let model = fit();
    let rebuilt = VectorSpaceModel::from_parts(
        model.analyzer().clone(),
        model.vocabulary().to_vec(),
        model.idf().to_vec(),
        model.rows().to_vec(),
    )
    .expect("valid parts");
    assert_eq!(rebuilt, model);
}

#[test]
fn from_parts_rejects_structural_damage() {
    let model = fit();
    let analyzer = model.analyzer().clone();
    let vocab = model.vocabulary().to_vec();
    let idf = model.idf().to_vec();
    let rows = model.rows().to_vec();

    let mut unsorted = vocab.clone();
    unsorted.swap(0, 1);
    assert!(matches!(
        VectorSpaceModel::from_parts(analyzer.clone(), unsorted, idf.clone(), rows.clone()),
        Err(Error::MalformedPersistedIndex(_))
    ));

    assert!(matches!(
        VectorSpaceModel::from_parts(analyzer.clone(), vocab.clone(), idf[1..].to_vec(), rows.clone()),
        Err(Error::MalformedPersistedIndex(_))
    ));

    let mut out_of_range = rows.clone();
    out_of_range[0].push((vocab.len() + 3, 0.1));
    assert!(matches!(
        VectorSpaceModel::from_parts(analyzer.clone(), vocab.clone(), idf.clone(), out_of_range),
        Err(Error::MalformedPersistedIndex(_))
    ));

    let mut negative = rows;
    negative[1][0].1 = -0.5;
    assert!(matches!(
        VectorSpaceModel::from_parts(analyzer, vocab, idf, negative),
        Err(Error::MalformedPersistedIndex(_))
    ));
}
