use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::summary::PassengerBreakdown;

pub const MAX_PASSENGERS: u32 = 9;
pub const MAX_LAP_INFANTS_PER_ADULT: u32 = 1;
pub const MAX_SEAT_INFANTS_PER_ADULT: u32 = 2;
pub const MAX_INFANTS_PER_ADULT: u32 = 2;
pub const MAX_CHILDREN_PER_ADULT: u32 = 8;
pub const MIN_CHILD_AGE: u32 = 3;
pub const MAX_CHILD_AGE: u32 = 15;

/// Passenger rules in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerRule {
    TotalCap,
    LapInfantRatio,
    SeatInfantRatio,
    InfantCombinedRatio,
    ChildRatio,
}

impl PassengerRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalCap => "total_cap",
            Self::LapInfantRatio => "lap_infant_ratio",
            Self::SeatInfantRatio => "seat_infant_ratio",
            Self::InfantCombinedRatio => "infant_combined_ratio",
            Self::ChildRatio => "child_ratio",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct PassengerRuleViolation {
    pub rule: PassengerRule,
    pub message: String,
    pub suggestion: Option<String>,
}

impl PassengerRuleViolation {
    fn new(rule: PassengerRule, message: String, suggestion: &str) -> Self {
        Self { rule, message, suggestion: Some(suggestion.to_string()) }
    }
}

/// Checks the five passenger rules in fixed order and reports the first violation.
///
/// Nothing is clamped. Each message carries the counts that broke the rule so the
/// traveller can correct exactly that number.
pub fn validate_passengers(passengers: &PassengerBreakdown) -> Result<(), PassengerRuleViolation> {
    let supervising = passengers.supervising();
    let total = passengers.total();

    if total > MAX_PASSENGERS {
        return Err(PassengerRuleViolation::new(
            PassengerRule::TotalCap,
            format!(
                "at most {MAX_PASSENGERS} passengers fit in one booking; this request has {total} \
                 (adults {}, seniors {}, children {}, seat infants {}, lap infants {})",
                passengers.adults,
                passengers.seniors,
                passengers.children,
                passengers.seat_infants,
                passengers.lap_infants
            ),
            "Reduce the group or split it into separate bookings",
        ));
    }

    let lap = passengers.lap_infants;
    if lap > 0 && supervising == 0 {
        return Err(PassengerRuleViolation::new(
            PassengerRule::LapInfantRatio,
            format!("{lap} lap infant(s) need an accompanying adult or senior, but there are none"),
            "Add at least one adult or senior traveller",
        ));
    }
    if lap > supervising * MAX_LAP_INFANTS_PER_ADULT {
        return Err(PassengerRuleViolation::new(
            PassengerRule::LapInfantRatio,
            format!(
                "max {MAX_LAP_INFANTS_PER_ADULT} lap infant per adult/senior: \
                 {lap} lap infants for {supervising} adult(s)/senior(s)"
            ),
            "Book the extra infants as seat infants or add adults",
        ));
    }

    let seat = passengers.seat_infants;
    if seat > 0 && supervising == 0 {
        return Err(PassengerRuleViolation::new(
            PassengerRule::SeatInfantRatio,
            format!(
                "{seat} seat infant(s) need an accompanying adult or senior, but there are none"
            ),
            "Add at least one adult or senior traveller",
        ));
    }
    if seat > supervising * MAX_SEAT_INFANTS_PER_ADULT {
        return Err(PassengerRuleViolation::new(
            PassengerRule::SeatInfantRatio,
            format!(
                "max {MAX_SEAT_INFANTS_PER_ADULT} seat infants per adult/senior: \
                 {seat} seat infants for {supervising} adult(s)/senior(s)"
            ),
            "Reduce the seat infants or add adults",
        ));
    }

    if lap + seat > supervising * MAX_INFANTS_PER_ADULT {
        return Err(PassengerRuleViolation::new(
            PassengerRule::InfantCombinedRatio,
            format!(
                "max {MAX_INFANTS_PER_ADULT} infants in total per adult/senior: \
                 {lap} lap + {seat} seat infants for {supervising} adult(s)/senior(s)"
            ),
            "Reduce the infants or add adults",
        ));
    }

    validate_children(passengers, supervising)
}

fn validate_children(
    passengers: &PassengerBreakdown,
    supervising: u32,
) -> Result<(), PassengerRuleViolation> {
    let children = passengers.children;
    let ages = &passengers.children_ages;

    if children > 0 && supervising == 0 {
        return Err(PassengerRuleViolation::new(
            PassengerRule::ChildRatio,
            format!("{children} child(ren) need an accompanying adult or senior, but there are none"),
            "Add at least one adult or senior traveller",
        ));
    }
    if children > supervising * MAX_CHILDREN_PER_ADULT {
        return Err(PassengerRuleViolation::new(
            PassengerRule::ChildRatio,
            format!(
                "max {MAX_CHILDREN_PER_ADULT} children per adult/senior: \
                 {children} children for {supervising} adult(s)/senior(s)"
            ),
            "Reduce the children or add adults",
        ));
    }
    if ages.len() != children as usize {
        return Err(PassengerRuleViolation::new(
            PassengerRule::ChildRatio,
            format!("{} child age(s) provided for {children} child(ren)", ages.len()),
            "Give exactly one age per child",
        ));
    }
    if let Some(age) = ages.iter().find(|age| !(MIN_CHILD_AGE..=MAX_CHILD_AGE).contains(*age)) {
        return Err(PassengerRuleViolation::new(
            PassengerRule::ChildRatio,
            format!("child age {age} is outside {MIN_CHILD_AGE}-{MAX_CHILD_AGE}"),
            "Under 3 travels as an infant; 16 and over travels as an adult",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_passengers, PassengerRule};
    use crate::domain::summary::PassengerBreakdown;

    fn party(adults: u32, seniors: u32) -> PassengerBreakdown {
        PassengerBreakdown { adults, seniors, ..PassengerBreakdown::default() }
    }

    fn rule_of(passengers: &PassengerBreakdown) -> Option<PassengerRule> {
        validate_passengers(passengers).err().map(|violation| violation.rule)
    }

    #[test]
    fn a_valid_mixed_party_passes() {
        let passengers = PassengerBreakdown {
            adults: 2,
            seniors: 1,
            children: 2,
            children_ages: vec![3, 15],
            seat_infants: 1,
            lap_infants: 2,
        };
        assert_eq!(validate_passengers(&passengers), Ok(()));
    }

    #[test]
    fn total_above_nine_is_rejected_first() {
        let passengers = PassengerBreakdown { lap_infants: 9, ..party(1, 0) };
        assert_eq!(rule_of(&passengers), Some(PassengerRule::TotalCap));
        assert_eq!(rule_of(&party(9, 0)), None);
        assert_eq!(rule_of(&party(6, 4)), Some(PassengerRule::TotalCap));
    }

    #[test]
    fn one_lap_infant_per_adult() {
        let over = PassengerBreakdown { lap_infants: 2, ..party(1, 0) };
        let violation = validate_passengers(&over).expect_err("two laps on one adult");
        assert_eq!(violation.rule, PassengerRule::LapInfantRatio);
        assert!(violation.message.contains("max 1 lap infant per adult/senior"));
        assert!(violation.message.contains("2 lap infants for 1 adult"));

        let fine = PassengerBreakdown { lap_infants: 2, ..party(2, 0) };
        assert_eq!(validate_passengers(&fine), Ok(()));

        let senior = PassengerBreakdown { lap_infants: 1, ..party(0, 1) };
        assert_eq!(validate_passengers(&senior), Ok(()));
    }

    #[test]
    fn unaccompanied_infants_are_rejected() {
        let lap = PassengerBreakdown { lap_infants: 1, ..party(0, 0) };
        assert_eq!(rule_of(&lap), Some(PassengerRule::LapInfantRatio));

        let seat = PassengerBreakdown { seat_infants: 1, ..party(0, 0) };
        assert_eq!(rule_of(&seat), Some(PassengerRule::SeatInfantRatio));
    }

    #[test]
    fn seat_infants_cap_at_two_per_adult() {
        let fine = PassengerBreakdown { seat_infants: 2, ..party(1, 0) };
        assert_eq!(rule_of(&fine), None);

        let over = PassengerBreakdown { seat_infants: 3, ..party(1, 0) };
        assert_eq!(rule_of(&over), Some(PassengerRule::SeatInfantRatio));
    }

    #[test]
    fn combined_infants_cap_binds_when_both_kinds_present() {
        let over = PassengerBreakdown { lap_infants: 1, seat_infants: 2, ..party(1, 0) };
        let violation = validate_passengers(&over).expect_err("three infants for one adult");
        assert_eq!(violation.rule, PassengerRule::InfantCombinedRatio);
        assert!(violation.message.contains("1 lap + 2 seat infants for 1 adult"));

        let fine = PassengerBreakdown { lap_infants: 1, seat_infants: 1, ..party(1, 0) };
        assert_eq!(rule_of(&fine), None);
    }

    #[test]
    fn children_need_matching_ages() {
        let mismatch = PassengerBreakdown { children: 3, children_ages: vec![5, 8], ..party(1, 0) };
        let violation = validate_passengers(&mismatch).expect_err("two ages for three children");
        assert_eq!(violation.rule, PassengerRule::ChildRatio);
        assert!(violation.message.contains("2 child age(s) provided for 3 child(ren)"));

        let stray_ages = PassengerBreakdown { children_ages: vec![7], ..party(1, 0) };
        assert_eq!(rule_of(&stray_ages), Some(PassengerRule::ChildRatio));
    }

    #[test]
    fn child_ages_must_sit_between_three_and_fifteen() {
        for age in [2, 16] {
            let passengers =
                PassengerBreakdown { children: 1, children_ages: vec![age], ..party(1, 0) };
            assert_eq!(rule_of(&passengers), Some(PassengerRule::ChildRatio), "age {age}");
        }
    }

    #[test]
    fn children_need_an_adult_and_ratio() {
        let alone = PassengerBreakdown { children: 1, children_ages: vec![10], ..party(0, 0) };
        assert_eq!(rule_of(&alone), Some(PassengerRule::ChildRatio));

        let at_cap = PassengerBreakdown { children: 8, children_ages: vec![5; 8], ..party(1, 0) };
        assert_eq!(rule_of(&at_cap), None);
    }

    #[test]
    fn flipping_a_single_rule_names_that_rule() {
        let base = PassengerBreakdown {
            adults: 1,
            seniors: 1,
            children: 1,
            children_ages: vec![6],
            seat_infants: 1,
            lap_infants: 1,
        };
        assert_eq!(rule_of(&base), None);

        let cases = [
            (PassengerBreakdown { adults: 6, ..base.clone() }, PassengerRule::TotalCap),
            (PassengerBreakdown { lap_infants: 3, ..base.clone() }, PassengerRule::LapInfantRatio),
            (PassengerBreakdown { seat_infants: 5, ..base.clone() }, PassengerRule::SeatInfantRatio),
            (
                PassengerBreakdown { lap_infants: 2, seat_infants: 3, ..base.clone() },
                PassengerRule::InfantCombinedRatio,
            ),
            (PassengerBreakdown { children_ages: vec![1], ..base.clone() }, PassengerRule::ChildRatio),
        ];

        for (passengers, expected) in cases {
            assert_eq!(rule_of(&passengers), Some(expected), "{passengers:?}");
        }
    }
}
