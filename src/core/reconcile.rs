use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::{Finding, Severity};
use super::numeric::{round_money, saturating_sum};
use super::types::{LineItem, Totals};

/// Tolerances for comparing declared totals with totals computed from lines.
///
/// Documents round per line and per header independently, so exact equality
/// is not expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Allowed difference for the default warning checks.
    pub tolerance: Decimal,
    /// Escalate to errors when the header declares net, VAT and gross.
    pub strict: bool,
    /// Allowed difference once strict checks apply.
    pub strict_tolerance: Decimal,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: dec!(0.05),
            strict: false,
            strict_tolerance: dec!(0.02),
        }
    }
}

impl ReconcileConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Sum of line nets, rounded to cents.
pub fn net_from_lines(lines: &[LineItem]) -> Decimal {
    round_money(saturating_sum(lines.iter().map(|l| l.line_net)), 2)
}

/// Sum of per-line VAT (`line_net * vat_percent / 100`), rounded to cents once.
pub fn vat_from_lines(lines: &[LineItem]) -> Decimal {
    let hundred = dec!(100);
    round_money(
        saturating_sum(
            lines
                .iter()
                .map(|l| l.line_net.saturating_mul(l.vat_percent) / hundred),
        ),
        2,
    )
}

/// Compare declared totals against the computed ones.
///
/// Every check runs; none short-circuits another. `totals` must already
/// carry `calc_net_from_lines` and `calc_vat_from_lines`.
pub fn reconcile(id: &str, totals: &Totals, config: &ReconcileConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if id.trim().is_empty() {
        findings.push(Finding::warning("missing invoice id."));
    }

    let fully_declared =
        !totals.net.is_zero() && !totals.vat.is_zero() && !totals.gross.is_zero();
    let (severity, tolerance) = if config.strict && fully_declared {
        (Severity::Error, config.strict_tolerance)
    } else {
        (Severity::Warning, config.tolerance)
    };

    if !totals.net.is_zero() && totals.calc_net_from_lines.saturating_sub(totals.net).abs() > tolerance {
        findings.push(Finding {
            severity,
            message: format!(
                "net from lines ({}) differs from declared net ({}).",
                totals.calc_net_from_lines, totals.net
            ),
        });
    }

    if !totals.vat.is_zero() && totals.calc_vat_from_lines.saturating_sub(totals.vat).abs() > tolerance {
        findings.push(Finding {
            severity,
            message: format!(
                "VAT from lines ({}) differs from declared VAT ({}).",
                totals.calc_vat_from_lines, totals.vat
            ),
        });
    }

    if config.strict && fully_declared {
        let expected_gross = totals.net.saturating_add(totals.vat);
        if totals.gross.saturating_sub(expected_gross).abs() > config.strict_tolerance {
            findings.push(Finding::error(format!(
                "declared gross ({}) differs from net + VAT ({}).",
                totals.gross, expected_gross
            )));
        }
    }

    if !findings.is_empty() {
        tracing::debug!(count = findings.len(), "reconciliation produced findings");
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(net: Decimal, vat: Decimal) -> LineItem {
        LineItem {
            line_net: net,
            vat_percent: vat,
            ..LineItem::default()
        }
    }

    fn totals(net: Decimal, vat: Decimal, gross: Decimal, lines: &[LineItem]) -> Totals {
        Totals {
            net,
            vat,
            gross,
            calc_net_from_lines: net_from_lines(lines),
            calc_vat_from_lines: vat_from_lines(lines),
            ..Totals::default()
        }
    }

    #[test]
    fn vat_is_rounded_once_over_the_sum() {
        // 3 × 0.333 × 10% = 0.0999 → 0.10, per-line rounding would give 0.09
        let lines = vec![
            line(dec!(0.333), dec!(10)),
            line(dec!(0.333), dec!(10)),
            line(dec!(0.333), dec!(10)),
        ];
        assert_eq!(vat_from_lines(&lines), dec!(0.10));
    }

    #[test]
    fn within_tolerance_is_clean() {
        let lines = vec![line(dec!(100.04), dec!(19))];
        let t = totals(dec!(100.00), dec!(19.01), dec!(119.01), &lines);
        assert!(reconcile("INV-1", &t, &ReconcileConfig::default()).is_empty());
    }

    #[test]
    fn zero_declared_totals_are_not_checked() {
        let lines = vec![line(dec!(50), dec!(19))];
        let t = totals(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, &lines);
        assert!(reconcile("INV-1", &t, &ReconcileConfig::default()).is_empty());
    }

    #[test]
    fn strict_escalates_and_checks_gross() {
        let lines = vec![line(dec!(100.03), dec!(19))];
        let t = totals(dec!(100.00), dec!(19.00), dec!(120.00), &lines);

        let lenient = reconcile("INV-1", &t, &ReconcileConfig::default());
        assert!(lenient.is_empty());

        let strict = reconcile("INV-1", &t, &ReconcileConfig::strict());
        assert_eq!(strict.len(), 2);
        assert!(strict.iter().all(Finding::is_error));
        assert!(strict[0].message.contains("100.03"));
        assert!(strict[1].message.contains("120.00"));
    }

    #[test]
    fn strict_needs_all_three_declared() {
        let lines = vec![line(dec!(90), dec!(0))];
        let t = totals(dec!(100.00), Decimal::ZERO, Decimal::ZERO, &lines);
        let findings = reconcile("INV-1", &t, &ReconcileConfig::strict());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
