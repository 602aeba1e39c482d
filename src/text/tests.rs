use super::*;

#[test]
fn test_normalize_empty() {
    assert_eq!(normalize(""), "");
}

#[test]
fn test_normalize_stopword_only() {
    assert_eq!(normalize("the a an is of"), "");
    assert_eq!(normalize("   \t\n  "), "");
}

#[test]
fn test_normalize_deterministic() {
    let input = "Mitochondria produce ATP energy, through cellular respiration!";
    assert_eq!(normalize(input), normalize(input));
}

#[test]
fn test_normalize_case_folds_and_strips_punctuation() {
    assert_eq!(
        normalize("Photosynthesis, in PLANTS; converts sunlight."),
        "photosynthesis plant convert sunlight"
    );
}

#[test]
fn test_normalize_drops_numeric_tokens() {
    assert_eq!(normalize("atp 42 energy 3rd"), "atp energy");
}

#[test]
fn test_normalize_reduces_plurals() {
    assert_eq!(normalize("machines enzymes children mice"), "machine enzyme child mouse");
}

#[test]
fn test_normalize_keeps_s_final_lemmas() {
    // class/-ss, basis/-is, virus/-us stay intact
    assert_eq!(normalize("class virus"), "class virus");
}

#[test]
fn test_tokenize_filters_stopwords() {
    let tokens = tokenize("The cell is a unit of life");
    assert_eq!(tokens, vec!["cell", "unit", "life"]);
}

#[test]
fn test_contractions_split_into_parts() {
    // "don't" splits at the apostrophe; "don" and "t" are stopwords
    assert_eq!(normalize("don't"), "");
}

#[test]
fn test_concept_tokens_dedup_and_order() {
    let concepts = concept_tokens("energy cell energy cell membrane", 16);
    assert_eq!(concepts, vec!["energy", "cell", "membrane"]);
}

#[test]
fn test_concept_tokens_drop_short_tokens() {
    let concepts = concept_tokens("dna is in the cell", 16);
    // "dna" is exactly three characters: kept; "is"/"in"/"the" dropped
    assert_eq!(concepts, vec!["dna", "cell"]);
}

#[test]
fn test_concept_tokens_cap() {
    let text = "alpha beta gamma delta epsilon zeta";
    let concepts = concept_tokens(text, 3);
    assert_eq!(concepts.len(), 3);
    assert_eq!(concepts, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_lexicon_shared_is_singleton() {
    let a = Lexicon::shared() as *const Lexicon;
    let b = Lexicon::shared() as *const Lexicon;
    assert_eq!(a, b);
}

#[test]
fn test_lemma_irregulars() {
    let lexicon = Lexicon::shared();
    assert_eq!(lexicon.lemma("children"), "child");
    assert_eq!(lexicon.lemma("hypotheses"), "hypothesis");
}
