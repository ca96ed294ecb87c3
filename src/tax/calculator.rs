use super::deductions::{total_deductions, Deduction};
use super::slabs::TaxSlab;
use crate::money::serialize_decimal;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Outcome of a progressive tax computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    /// Income less all deductions. Negative when deductions exceed income.
    #[serde(serialize_with = "serialize_decimal")]
    pub taxable_income: Decimal,
    /// Sum of marginal tax across slabs, 2dp
    #[serde(serialize_with = "serialize_decimal")]
    pub total_tax: Decimal,
    pub deductions: Vec<Deduction>,
    pub slabs_used: Vec<TaxSlab>,
}

/// Marginal tax due within a single slab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlabContribution {
    pub slab: TaxSlab,
    pub taxed_amount: Decimal,
    pub tax: Decimal,
}

/// Compute tax owed on `total_income` after `deductions`.
///
/// `slabs` must already be a valid ascending partition starting at 0
/// (see [`super::slabs::validate_slabs`]); they are not re-checked here.
/// Income and each deduction are expected within
/// [`MAX_AMOUNT`](crate::money::MAX_AMOUNT), as [`super::TaxInput::resolve`] ensures.
pub fn calculate_tax(total_income: Decimal, deductions: &[Deduction], slabs: &[TaxSlab]) -> TaxResult {
    let taxable_income = total_income - total_deductions(deductions);
    let total_tax: Decimal = slab_breakdown(taxable_income, slabs)
        .iter()
        .map(|c| c.tax)
        .sum();

    log::debug!(
        "Income {} less deductions {} = taxable {}, tax {}",
        total_income,
        total_income - taxable_income,
        taxable_income,
        total_tax
    );

    TaxResult {
        taxable_income,
        total_tax: total_tax.round_dp(2),
        deductions: deductions.to_vec(),
        slabs_used: slabs.to_vec(),
    }
}

/// Tax contributed by each slab that `taxable_income` reaches into
pub fn slab_breakdown(taxable_income: Decimal, slabs: &[TaxSlab]) -> Vec<SlabContribution> {
    slabs
        .iter()
        .take_while(|slab| taxable_income > slab.min)
        .map(|slab| {
            let upper = slab
                .max
                .map_or(taxable_income, |max| max.min(taxable_income));
            let taxed_amount = upper - slab.min;
            let tax = taxed_amount * slab.rate / dec!(100);
            log::debug!(
                "Slab from {} @ {}%: taxed {} -> {}",
                slab.min,
                slab.rate,
                taxed_amount,
                tax
            );
            SlabContribution {
                slab: slab.clone(),
                taxed_amount,
                tax,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::MAX_AMOUNT;
    use crate::tax::deductions::DeductionSection;
    use crate::tax::slabs::SlabTable;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn india() -> Vec<TaxSlab> {
        SlabTable::india_fy2024().slabs
    }

    fn deductions(amounts: &[Decimal]) -> Vec<Deduction> {
        amounts
            .iter()
            .map(|&a| Deduction::new(DeductionSection::Section80C, a, "EPF"))
            .collect()
    }

    fn tax_on(taxable: Decimal) -> Decimal {
        calculate_tax(taxable, &[], &india()).total_tax
    }

    #[test]
    fn income_in_third_slab() {
        let ded = deductions(&[dec!(100000), dec!(50000)]);
        let result = calculate_tax(dec!(1000000), &ded, &india());
        assert_eq!(result.taxable_income, dec!(850000));
        // 5% of 300k + 10% of 250k
        assert_eq!(result.total_tax, dec!(40000));
        assert_eq!(result.deductions, ded);
        assert_eq!(result.slabs_used, india());
    }

    #[test]
    fn deductions_exceeding_income_give_zero_tax() {
        let result = calculate_tax(dec!(200000), &deductions(&[dec!(250000)]), &india());
        assert_eq!(result.taxable_income, dec!(-50000));
        assert_eq!(result.total_tax, Decimal::ZERO);
    }

    #[test]
    fn zero_rate_slab_only() {
        assert_eq!(tax_on(dec!(0)), Decimal::ZERO);
        assert_eq!(tax_on(dec!(300000)), Decimal::ZERO);
    }

    #[test]
    fn every_slab_boundary() {
        assert_eq!(tax_on(dec!(600000)), dec!(15000));
        assert_eq!(tax_on(dec!(900000)), dec!(45000));
        assert_eq!(tax_on(dec!(1200000)), dec!(90000));
        assert_eq!(tax_on(dec!(1500000)), dec!(150000));
        assert_eq!(tax_on(dec!(2000000)), dec!(300000));
    }

    #[test]
    fn fractional_income_rounds_to_paise() {
        // 5% of 0.333 = 0.01665
        assert_eq!(tax_on(dec!(300000.333)), dec!(0.02));
    }

    #[test]
    fn marginal_not_flat() {
        // The top rate applies only to income above 15 lakh
        let tax = tax_on(dec!(1500001));
        assert_eq!(tax, dec!(150000.30));
    }

    #[test]
    fn largest_accepted_income() {
        let result = calculate_tax(MAX_AMOUNT, &deductions(&[MAX_AMOUNT, MAX_AMOUNT]), &india());
        assert_eq!(result.taxable_income, -MAX_AMOUNT);
        assert_eq!(result.total_tax, Decimal::ZERO);

        // 150000 below the top slab plus 30% of everything above 15 lakh
        let top = calculate_tax(MAX_AMOUNT, &[], &india()).total_tax;
        assert_eq!(top, dec!(150000) + (MAX_AMOUNT - dec!(1500000)) * dec!(0.3));
    }

    #[test]
    fn breakdown_lists_reached_slabs_only() {
        let breakdown = slab_breakdown(dec!(850000), &india());
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[1].taxed_amount, dec!(300000));
        assert_eq!(breakdown[2].taxed_amount, dec!(250000));
        assert_eq!(breakdown[2].tax, dec!(25000));
        assert!(slab_breakdown(dec!(-1), &india()).is_empty());
    }

    #[test]
    fn result_serializes_as_numbers() {
        let result = calculate_tax(dec!(1000000), &deductions(&[dec!(150000)]), &india());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["taxable_income"], serde_json::json!(850000.0));
        assert_eq!(json["total_tax"], serde_json::json!(40000.0));
        assert_eq!(json["deductions"][0]["section"], "80C");
        assert_eq!(json["slabs_used"].as_array().unwrap().len(), 6);
        assert!(json["slabs_used"][5].get("max").is_none());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_tax_is_monotonic_in_income(
            income in 0u64..5_000_000,
            bump in 0u64..1_000_000,
            deduction in 0u64..500_000
        ) {
            let ded = deductions(&[Decimal::from(deduction)]);
            let lower = calculate_tax(Decimal::from(income), &ded, &india()).total_tax;
            let higher = calculate_tax(Decimal::from(income + bump), &ded, &india()).total_tax;
            prop_assert!(higher >= lower, "{} -> {} but {} -> {}", income, lower, income + bump, higher);
        }

        #[test]
        fn prop_tax_is_continuous_at_slab_boundaries(
            boundary_index in 0usize..5,
            epsilon_paise in 1u64..100_000
        ) {
            let slabs = india();
            let boundary = slabs[boundary_index].max.unwrap();
            let next_rate = slabs[boundary_index + 1].rate;
            let epsilon = Decimal::new(epsilon_paise as i64, 2);

            let at = slab_breakdown(boundary, &slabs).iter().map(|c| c.tax).sum::<Decimal>();
            let above = slab_breakdown(boundary + epsilon, &slabs).iter().map(|c| c.tax).sum::<Decimal>();
            prop_assert_eq!(at, above - epsilon * next_rate / dec!(100));
        }

        #[test]
        fn prop_negative_taxable_income_is_untaxed(
            income in 0u64..1_000_000,
            excess in 1u64..1_000_000
        ) {
            let ded = deductions(&[Decimal::from(income + excess)]);
            let result = calculate_tax(Decimal::from(income), &ded, &india());
            prop_assert!(result.taxable_income < Decimal::ZERO);
            prop_assert!(result.total_tax.is_zero());
        }

        #[test]
        fn prop_repeated_computation_is_stable(income in 0u64..10_000_000, paise in 0u64..100) {
            let total = Decimal::from(income) + Decimal::new(paise as i64, 2);
            let first = calculate_tax(total, &[], &india());
            prop_assert_eq!(&first, &calculate_tax(total, &[], &india()));
            prop_assert_eq!(first.total_tax, first.total_tax.round_dp(2));
        }
    }
}
