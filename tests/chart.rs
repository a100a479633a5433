use kira_qpcr::io::chart_svg::{render_chart, render_target_chart};
use kira_qpcr::scores::chart::{ChartBar, build_chart, build_target_chart};
use kira_qpcr::scores::{
    CONTROL_GROUP, Group, NormalizedRow, SignificanceResult, TreatmentComparison,
};

fn row(treatment: &str, target: &str, ddcq: f64, sd: Option<f64>) -> NormalizedRow {
    NormalizedRow {
        treatment: treatment.to_string(),
        sample: format!("{}-1", treatment),
        target: target.to_string(),
        ct_reference: 20.0,
        ct_target: 21.0,
        delta_cq: 1.0,
        delta_cq_expression: 0.5,
        mean_delta_cq_expression: 0.5,
        stdev_delta_cq_expression: sd,
        ddcq_expression: ddcq,
        ddcq_expression_stdev: sd,
        percent_knockdown: (1.0 - ddcq) * 100.0,
    }
}

fn groups() -> Vec<Group> {
    vec![
        Group::treated("siB", vec!["siB-1".to_string()]),
        Group::treated("siA", vec!["siA-1".to_string()]),
        Group::control(vec!["Control-1".to_string()]),
    ]
}

fn significance() -> Vec<SignificanceResult> {
    vec![SignificanceResult {
        target: "TP53".to_string(),
        anova_f: Some(20.0),
        anova_p_value: Some(0.004),
        comparisons: vec![
            TreatmentComparison {
                treatment: "siB".to_string(),
                t_stat: Some(-6.0),
                p_value: Some(0.0005),
                symbol: "***".to_string(),
            },
            TreatmentComparison {
                treatment: "siA".to_string(),
                t_stat: Some(-1.0),
                p_value: Some(0.3),
                symbol: "ns".to_string(),
            },
        ],
    }]
}

#[test]
fn clusters_follow_group_order() {
    let rows = vec![
        row("siB", "TP53", 0.2, Some(0.05)),
        row("siA", "TP53", 0.9, None),
        row(CONTROL_GROUP, "TP53", 1.0, Some(0.1)),
        row("siB", "MYC", 0.6, None),
        row(CONTROL_GROUP, "MYC", 1.0, None),
    ];
    let chart = build_chart(&groups(), &rows, &significance());
    assert_eq!(chart.targets, vec!["TP53", "MYC"]);
    let names: Vec<&str> = chart.clusters.iter().map(|c| c.treatment.as_str()).collect();
    assert_eq!(names, vec!["siB", "siA", CONTROL_GROUP]);

    let sib = &chart.clusters[0];
    let tp53 = sib.bars[0].as_ref().unwrap();
    assert_eq!(tp53.value, 0.2);
    assert_eq!(tp53.error, Some(0.05));
    assert_eq!(tp53.symbol.as_deref(), Some("***"));
    assert_eq!(sib.bars[1].as_ref().unwrap().symbol, None);

    assert!(chart.clusters[1].bars[1].is_none());
    assert!(chart.clusters[2].bars.iter().flatten().all(|b| b.symbol.is_none()));
    assert!((chart.max_extent() - 1.1).abs() < 1e-12);
}

#[test]
fn groups_without_rows_are_left_out() {
    let rows = vec![row("siA", "TP53", 0.5, None), row(CONTROL_GROUP, "TP53", 1.0, None)];
    let chart = build_chart(&groups(), &rows, &[]);
    let names: Vec<&str> = chart.clusters.iter().map(|c| c.treatment.as_str()).collect();
    assert_eq!(names, vec!["siA", CONTROL_GROUP]);
}

#[test]
fn svg_carries_labels_and_symbols() {
    let rows = vec![
        row("siB", "TP53", 0.2, Some(0.05)),
        row("siA", "TP53", 0.9, None),
        row(CONTROL_GROUP, "TP53", 1.0, Some(0.1)),
    ];
    let chart = build_chart(&groups(), &rows, &significance());
    let svg = render_chart(&chart);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Relative Gene Expression Across Treatments"));
    assert!(svg.contains("Genes"));
    assert!(svg.contains("TP53"));
    assert!(svg.contains("siB"));
    assert!(svg.contains("***"));
    assert_eq!(svg, render_chart(&chart));
}

#[test]
fn empty_chart_still_renders() {
    let chart = build_chart(&groups(), &[], &[]);
    assert!(chart.clusters.is_empty());
    let svg = render_chart(&chart);
    assert!(svg.contains("</svg>"));
}

#[test]
fn target_chart_has_one_bar_per_treatment() {
    let rows = vec![
        row("siB", "TP53", 0.2, Some(0.05)),
        row("siB", "TP53", 0.2, Some(0.05)),
        row("siA", "TP53", 0.9, None),
        row(CONTROL_GROUP, "TP53", 1.0, Some(0.1)),
        row("siB", "MYC", 0.6, None),
    ];
    let result = &significance()[0];
    let chart = build_target_chart(result, &rows);
    assert_eq!(chart.target, "TP53");
    assert_eq!(chart.anova_p_value, Some(0.004));
    assert_eq!(chart.data.targets, vec!["TP53"]);

    let names: Vec<&str> = chart.data.clusters.iter().map(|c| c.treatment.as_str()).collect();
    assert_eq!(names, vec!["siB", "siA", CONTROL_GROUP]);
    let bars: Vec<&ChartBar> = chart
        .data
        .clusters
        .iter()
        .map(|c| c.bars[0].as_ref().unwrap())
        .collect();
    assert!((bars[0].value - 0.2).abs() < 1e-12);
    assert_eq!(bars[0].error, Some(0.05));
    assert_eq!(bars[0].symbol.as_deref(), Some("***"));
    assert_eq!(bars[1].error, None);
    assert_eq!(bars[1].symbol.as_deref(), Some("ns"));
    assert_eq!(bars[2].symbol, None);
}

#[test]
fn target_chart_title_carries_anova_p_value() {
    let rows = vec![
        row("siB", "TP53", 0.2, Some(0.05)),
        row("siA", "TP53", 0.9, None),
        row(CONTROL_GROUP, "TP53", 1.0, Some(0.1)),
    ];
    let svg = render_target_chart(&build_target_chart(&significance()[0], &rows));
    assert!(svg.contains("Relative Expression of TP53"));
    assert!(svg.contains("ANOVA p-value: 0.0040"));
    assert!(svg.contains("***"));
    assert!(!svg.contains("Genes"));
}

#[test]
fn target_chart_without_anova_says_undefined() {
    let mut result = significance()[0].clone();
    result.anova_p_value = None;
    let rows = vec![row(CONTROL_GROUP, "TP53", 1.0, None)];
    let svg = render_target_chart(&build_target_chart(&result, &rows));
    assert!(svg.contains("ANOVA p-value: undefined"));
}
