use kira_qpcr::math::hypothesis::{
    TestError, one_way_anova, significance_symbol, two_sample_t_test,
};

#[test]
fn symbol_thresholds_are_exact() {
    assert_eq!(significance_symbol(0.0009), "***");
    assert_eq!(significance_symbol(0.001), "**");
    assert_eq!(significance_symbol(0.0099), "**");
    assert_eq!(significance_symbol(0.01), "*");
    assert_eq!(significance_symbol(0.0499), "*");
    assert_eq!(significance_symbol(0.05), "ns");
    assert_eq!(significance_symbol(0.8), "ns");
}

#[test]
fn student_t_known_value() {
    let a = [1.0, 2.0, 3.0];
    let b = [4.0, 5.0, 6.0];
    let t = two_sample_t_test(&a, &b, false).unwrap();
    assert!((t.t_stat - 3.674234614174767).abs() < 1e-9);
    assert_eq!(t.df, 4.0);
    assert!((t.p_value - 0.021311641128756727).abs() < 1e-6, "{}", t.p_value);
}

#[test]
fn welch_matches_student_for_balanced_equal_variance() {
    let a = [1.0, 2.0, 3.0];
    let b = [4.0, 5.0, 6.0];
    let s = two_sample_t_test(&a, &b, false).unwrap();
    let w = two_sample_t_test(&a, &b, true).unwrap();
    assert!((s.t_stat - w.t_stat).abs() < 1e-12);
    assert!((w.df - 4.0).abs() < 1e-12);
    assert!((s.p_value - w.p_value).abs() < 1e-9);
}

#[test]
fn t_test_zero_variance_with_difference_is_zero_p() {
    let t = two_sample_t_test(&[1.0, 1.0], &[0.5, 0.5], false).unwrap();
    assert_eq!(t.p_value, 0.0);
    assert_eq!(
        two_sample_t_test(&[1.0, 1.0], &[1.0, 1.0], false),
        Err(TestError::Degenerate)
    );
}

#[test]
fn t_test_without_freedom_is_undefined() {
    assert_eq!(
        two_sample_t_test(&[1.0], &[2.0], false),
        Err(TestError::NoResidualFreedom)
    );
    assert_eq!(
        two_sample_t_test(&[1.0], &[2.0, 3.0], true),
        Err(TestError::NoResidualFreedom)
    );
}

#[test]
fn anova_two_groups_equals_t_squared() {
    let a = [1.0, 2.0, 3.0];
    let b = [4.0, 5.0, 6.0];
    let r = one_way_anova(&[&a, &b]).unwrap();
    assert!((r.f_stat - 13.5).abs() < 1e-12);
    assert!((r.p_value - 0.021311641128756727).abs() < 1e-6);
}

#[test]
fn anova_three_groups_closed_form() {
    // F(2, 6) survival at 3.0 is (1 + 2*3/6)^-3 = 0.125
    let r = one_way_anova(&[&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], &[3.0, 4.0, 5.0]]).unwrap();
    assert!((r.f_stat - 3.0).abs() < 1e-12);
    assert_eq!(r.df_between, 2.0);
    assert_eq!(r.df_within, 6.0);
    assert!((r.p_value - 0.125).abs() < 1e-9, "{}", r.p_value);
}

#[test]
fn anova_requires_two_groups_and_residual_freedom() {
    assert_eq!(
        one_way_anova(&[&[1.0, 2.0]]),
        Err(TestError::TooFewGroups(1))
    );
    assert_eq!(
        one_way_anova(&[&[1.0], &[2.0]]),
        Err(TestError::NoResidualFreedom)
    );
    assert_eq!(
        one_way_anova(&[&[1.0, 2.0], &[]]),
        Err(TestError::EmptyGroup)
    );
}
