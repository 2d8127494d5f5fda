use tropism_core::{
    AdaptationIndex, GeneRecord, GeneSet, Thresholds, UsageComparison, UsageError,
};

fn record(seq: &str, id: &str, product: &str) -> GeneRecord {
    GeneRecord {
        seq: seq.to_string(),
        id: id.to_string(),
        product: product.to_string(),
    }
}

fn virus() -> GeneSet {
    GeneSet::from_records(
        "virus_genes.ffn",
        vec![
            record("ATGTCATCCGAA", "v_0001", "major capsid protein"),
            record("ATGGA", "v_0002", "truncated gene"),
        ],
    )
    .unwrap()
}

fn host() -> GeneSet {
    GeneSet::from_records(
        "host_genes.ffn",
        vec![
            record("ATGTCAGAAGAG", "h_0001", "hypothetical protein"),
            record("ATGGAA", "h_0002", "tRNA-Met(cat)"),
            record("ATGGAA", "h_0003", "tRNA-Ser(tga)"),
            record("ATGGAA", "h_0004", "tRNA-Glu(ttc)"),
        ],
    )
    .unwrap()
}

#[test]
fn scenario_gene_level_statistics() {
    let virus = virus();
    // one record dropped for length, reported informationally
    assert_eq!(virus.skipped_genes(), &["v_0002".to_string()]);
    assert_eq!(virus.skipped_fraction(), 0.5);

    let thresholds = Thresholds::default();
    let counts = virus.codon_counts(thresholds).unwrap();
    assert_eq!(counts.counts["ATG"], 1);
    assert_eq!(counts.counts["TCA"], 1);
    assert_eq!(counts.counts["TCC"], 1);
    assert_eq!(counts.counts["GAA"], 1);
    assert_eq!(counts.counts.values().sum::<u64>(), 4);

    let aa = virus.amino_acid_counts(thresholds).unwrap();
    assert_eq!(aa[&'M'], 1);
    assert_eq!(aa[&'S'], 2);
    assert_eq!(aa[&'E'], 1);

    let frequency = virus.codon_frequency(thresholds).unwrap();
    assert_eq!(frequency["ATG"], 0.25);
    let sum: f64 = frequency.values().sum();
    assert!((sum - 1.0).abs() < 1e-12);

    let rscu = virus.rscu(thresholds).unwrap();
    assert_eq!(rscu["ATG"], 1.0);
    assert_eq!(rscu["TCA"], 3.0);
    assert_eq!(rscu["TCC"], 3.0);
    assert_eq!(rscu["GAA"], 2.0);
}

#[test]
fn scenario_usage_comparisons() {
    let virus = virus();
    let host = host();
    let thresholds = Thresholds::default();

    for (host_profile, virus_profile) in [
        (
            host.codon_frequency(thresholds).unwrap(),
            virus.codon_frequency(thresholds).unwrap(),
        ),
        (host.rscu(thresholds).unwrap(), virus.rscu(thresholds).unwrap()),
    ] {
        let comparison = UsageComparison::from_profiles(host_profile, virus_profile);
        let similarity = comparison.cosine_similarity();
        assert!(similarity > 0.0 && similarity <= 1.0 + 1e-12);
        assert!(comparison.r_squared() <= 1.0 + 1e-12);
        let fit = comparison.linear_fit();
        assert!(fit.slope.is_finite() && fit.intercept.is_finite());
    }

    let aa_comparison = UsageComparison::from_profiles(
        host.amino_acid_frequency(thresholds).unwrap(),
        virus.amino_acid_frequency(thresholds).unwrap(),
    );
    assert!(aa_comparison.cosine_similarity() > 0.0);
}

#[test]
fn scenario_adaptation_indices() {
    let virus = virus();
    let host = host();
    let index = AdaptationIndex::new(&virus, &host, Thresholds::default()).unwrap();

    let taai = index.taai(true);
    assert!(taai.host_trna > 0.0 && taai.host_trna <= 1.0);
    // the virus encodes no tRNAs, so the pooled pool is the host pool
    match taai.total_trna {
        Some(total) => assert!((total - taai.host_trna).abs() < 1e-12),
        None => panic!("pooled TAAI requested but absent"),
    }

    let tcai = index.tcai(false, true);
    assert!(tcai.host_trna > 0.0 && tcai.host_trna <= 1.0);
    let tcai_degenerate = index.tcai(true, true);
    assert!(tcai_degenerate.host_trna.is_finite());
}

#[test]
fn scenario_all_genes_imprecise_fails() {
    let set = GeneSet::from_records(
        "bad_genes.ffn",
        vec![
            record("ATGNNN", "g1", ""),
            record("NNNGAA", "g2", ""),
        ],
    )
    .unwrap();
    assert!(matches!(
        set.codon_counts(Thresholds::default()),
        Err(UsageError::TooManySkippedGenes { skipped: 2, total: 2, .. })
    ));
}

#[test]
fn scenario_zero_trna_gene_set() {
    let virus = virus();
    let counts = virus.trna_counts();
    assert_eq!(counts.total, 0);
    let frequency = virus.trna_frequency();
    assert!(frequency.by_amino_acid.values().all(|&f| f == 0.0));
    assert!(frequency.by_codon.values().all(|&f| f == 0.0));
}

#[test]
fn scores_serialize() {
    let virus = virus();
    let host = host();
    let index = AdaptationIndex::new(&virus, &host, Thresholds::default()).unwrap();
    let json = serde_json::to_string(&index.taai(true)).unwrap();
    assert!(json.contains("host_trna"));

    let frequency = virus.codon_frequency(Thresholds::default()).unwrap();
    let json = serde_json::to_string(frequency).unwrap();
    let back: std::collections::BTreeMap<String, f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, frequency);
}
