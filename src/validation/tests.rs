#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::error::FieldErrorKind;

fn month_id() -> String {
    Uuid::new_v4().to_string()
}

fn expense(amount: RawNumber) -> RawExpense {
    RawExpense {
        month_id: Some(month_id()),
        date: Some("2024-01-15".into()),
        amount: Some(amount),
        item_name: Some("Groceries".into()),
        category: Some("Shopping".into()),
        notes: None,
    }
}

fn income(source_type: &str, custom_source: Option<&str>) -> RawIncome {
    RawIncome {
        month_id: Some(month_id()),
        date: Some("2024-01-01".into()),
        amount: Some(RawNumber::from(2500_i64)),
        source_type: Some(source_type.into()),
        custom_source: custom_source.map(String::from),
        notes: None,
    }
}

fn kind_of(errors: &FieldErrors, field: &str) -> FieldErrorKind {
    errors.get(field).unwrap().kind
}

// ── Expense ───────────────────────────────────────────────────

#[test]
fn test_valid_expense() {
    let txn = validate_expense(&expense(RawNumber::from("12.50"))).unwrap();
    assert_eq!(txn.amount, dec!(12.50));
    assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(
        txn.details,
        TransactionDetails::Expense {
            item_name: "Groceries".into(),
            category: ExpenseCategory::Shopping,
        }
    );
    assert!(txn.notes.is_none());
}

#[test]
fn test_expense_amount_bounds() {
    for bad in ["0", "-1", "-0.01", "99999999.991", "100000000"] {
        let errors = validate_expense(&expense(RawNumber::from(bad))).unwrap_err();
        assert_eq!(kind_of(&errors, "amount"), FieldErrorKind::InvalidAmount, "{bad}");
    }
    let max = validate_expense(&expense(RawNumber::from("99999999.99"))).unwrap();
    assert_eq!(max.amount, dec!(99999999.99));
    let min = validate_expense(&expense(RawNumber::from("0.01"))).unwrap();
    assert_eq!(min.amount, dec!(0.01));
}

#[test]
fn test_expense_amount_from_json_number() {
    let raw: RawExpense = serde_json::from_value(serde_json::json!({
        "month_id": month_id(),
        "date": "2024-02-29",
        "amount": 0.1,
        "item_name": "Gum",
        "category": "Extra",
    }))
    .unwrap();
    let txn = validate_expense(&raw).unwrap();
    assert_eq!(txn.amount, dec!(0.1));
}

#[test]
fn test_expense_amount_not_a_number() {
    let errors = validate_expense(&expense(RawNumber::from("abc"))).unwrap_err();
    assert_eq!(kind_of(&errors, "amount"), FieldErrorKind::InvalidAmount);
}

#[test]
fn test_expense_invalid_dates() {
    for bad in ["2024-13-01", "2024-02-30", "2023-02-29", "15/01/2024", "2024-1-5"] {
        let mut raw = expense(RawNumber::from("1"));
        raw.date = Some(bad.into());
        let errors = validate_expense(&raw).unwrap_err();
        assert_eq!(kind_of(&errors, "date"), FieldErrorKind::InvalidDate, "{bad}");
    }
}

#[test]
fn test_expense_padded_date_is_invalid() {
    for padded in [" 2024-06-01", "2024-06-01 ", " 2024-06-01 "] {
        let mut raw = expense(RawNumber::from("1"));
        raw.date = Some(padded.into());
        let errors = validate_expense(&raw).unwrap_err();
        assert_eq!(kind_of(&errors, "date"), FieldErrorKind::InvalidDate, "{padded:?}");
    }
    let mut raw = expense(RawNumber::from("1"));
    raw.date = Some("   ".into());
    let errors = validate_expense(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "date"), FieldErrorKind::Required);
}

#[test]
fn test_amounts_limited_to_cents() {
    for bad in ["0.001", "0.0001", "12.345"] {
        let errors = validate_expense(&expense(RawNumber::from(bad))).unwrap_err();
        assert_eq!(kind_of(&errors, "amount"), FieldErrorKind::InvalidAmount, "{bad}");
    }
    let trailing = validate_expense(&expense(RawNumber::from("12.500"))).unwrap();
    assert_eq!(trailing.amount, dec!(12.5));

    let errors = validate_budget_entries(&[RawBudgetEntry::new("Travel", "10.005")]).unwrap_err();
    assert_eq!(
        kind_of(&errors, "budgets[0].budget_amount"),
        FieldErrorKind::InvalidAmount
    );
    assert!(validate_starting_balance(&RawNumber::from("-0.015")).is_err());
    assert_eq!(
        validate_starting_balance(&RawNumber::from("-0.01")).unwrap(),
        dec!(-0.01)
    );
}

#[test]
fn test_expense_text_bounds() {
    let mut raw = expense(RawNumber::from("1"));
    raw.item_name = Some("x".repeat(201));
    raw.notes = Some("n".repeat(501));
    let errors = validate_expense(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "item_name"), FieldErrorKind::TooLong);
    assert_eq!(kind_of(&errors, "notes"), FieldErrorKind::TooLong);

    raw.item_name = Some("x".repeat(200));
    raw.notes = Some("n".repeat(500));
    assert!(validate_expense(&raw).is_ok());
}

#[test]
fn test_expense_blank_item_name_required() {
    let mut raw = expense(RawNumber::from("1"));
    raw.item_name = Some("   ".into());
    let errors = validate_expense(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "item_name"), FieldErrorKind::Required);
}

#[test]
fn test_expense_unknown_category() {
    let mut raw = expense(RawNumber::from("1"));
    raw.category = Some("Groceries".into());
    let errors = validate_expense(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "category"), FieldErrorKind::InvalidEnum);
}

#[test]
fn test_expense_blank_notes_become_none() {
    let mut raw = expense(RawNumber::from("1"));
    raw.notes = Some("  ".into());
    assert!(validate_expense(&raw).unwrap().notes.is_none());
}

#[test]
fn test_expense_collects_every_failure() {
    let errors = validate_expense(&RawExpense::default()).unwrap_err();
    for field in ["month_id", "date", "amount", "item_name", "category"] {
        assert_eq!(kind_of(&errors, field), FieldErrorKind::Required, "{field}");
    }
}

#[test]
fn test_expense_bad_month_id() {
    let mut raw = expense(RawNumber::from("1"));
    raw.month_id = Some("not-a-uuid".into());
    let errors = validate_expense(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "month_id"), FieldErrorKind::InvalidId);
}

// ── Income ────────────────────────────────────────────────────

#[test]
fn test_income_other_requires_custom_source() {
    for custom in [None, Some(""), Some("   ")] {
        let errors = validate_income(&income("Other", custom)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(kind_of(&errors, "custom_source"), FieldErrorKind::Required);
    }
}

#[test]
fn test_income_other_with_custom_source() {
    let txn = validate_income(&income("Other", Some(" Lottery "))).unwrap();
    assert_eq!(
        txn.details,
        TransactionDetails::Income {
            source: IncomeSource::Other("Lottery".into())
        }
    );
}

#[test]
fn test_income_custom_source_ignored_for_other_types() {
    for t in ["Salary", "Transfer", "Business"] {
        let txn = validate_income(&income(t, Some("anything"))).unwrap();
        let TransactionDetails::Income { source } = txn.details else {
            panic!("expected income");
        };
        assert_eq!(source.custom_source(), None);
        assert_eq!(source.source_type().as_str(), t);
    }
}

#[test]
fn test_income_custom_source_too_long() {
    let long = "s".repeat(201);
    let errors = validate_income(&income("Other", Some(&long))).unwrap_err();
    assert_eq!(kind_of(&errors, "custom_source"), FieldErrorKind::TooLong);
}

#[test]
fn test_income_invalid_source_type() {
    let errors = validate_income(&income("Lottery", None)).unwrap_err();
    assert_eq!(kind_of(&errors, "source_type"), FieldErrorKind::InvalidEnum);
    assert!(errors.get("custom_source").is_none());
}

// ── Updates ───────────────────────────────────────────────────

#[test]
fn test_expense_update_requires_id_only() {
    let raw = RawExpenseUpdate {
        id: Some(Uuid::new_v4().to_string()),
        ..Default::default()
    };
    let patch = validate_expense_update(&raw).unwrap();
    assert!(patch.date.is_none());
    assert!(patch.amount.is_none());
    assert!(patch.notes.is_none());

    let errors = validate_expense_update(&RawExpenseUpdate::default()).unwrap_err();
    assert_eq!(kind_of(&errors, "id"), FieldErrorKind::Required);
}

#[test]
fn test_expense_update_checks_present_fields() {
    let raw = RawExpenseUpdate {
        id: Some(Uuid::new_v4().to_string()),
        amount: Some(RawNumber::from("0")),
        date: Some("2024-02-31".into()),
        category: Some("Food".into()),
        ..Default::default()
    };
    let errors = validate_expense_update(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "amount"), FieldErrorKind::InvalidAmount);
    assert_eq!(kind_of(&errors, "date"), FieldErrorKind::InvalidDate);
    assert_eq!(kind_of(&errors, "category"), FieldErrorKind::InvalidEnum);
}

#[test]
fn test_update_notes_tri_state() {
    let id = Uuid::new_v4().to_string();
    let absent: RawExpenseUpdate = serde_json::from_value(serde_json::json!({ "id": id })).unwrap();
    assert_eq!(validate_expense_update(&absent).unwrap().notes, None);

    let null: RawExpenseUpdate =
        serde_json::from_value(serde_json::json!({ "id": id, "notes": null })).unwrap();
    assert_eq!(validate_expense_update(&null).unwrap().notes, Some(None));

    let blank: RawExpenseUpdate =
        serde_json::from_value(serde_json::json!({ "id": id, "notes": "" })).unwrap();
    assert_eq!(validate_expense_update(&blank).unwrap().notes, Some(None));
}

#[test]
fn test_income_update_rechecks_other_rule() {
    let raw = RawIncomeUpdate {
        id: Some(Uuid::new_v4().to_string()),
        source_type: Some("Other".into()),
        ..Default::default()
    };
    let errors = validate_income_update(&raw).unwrap_err();
    assert_eq!(kind_of(&errors, "custom_source"), FieldErrorKind::Required);

    let raw = RawIncomeUpdate {
        custom_source: Some(Some("Garage sale".into())),
        ..raw
    };
    let patch = validate_income_update(&raw).unwrap();
    assert_eq!(
        patch.details,
        DetailsPatch::Income {
            source: SourcePatch::Replace(IncomeSource::Other("Garage sale".into()))
        }
    );
}

#[test]
fn test_income_update_custom_source_alone() {
    let raw = RawIncomeUpdate {
        id: Some(Uuid::new_v4().to_string()),
        custom_source: Some(Some("Refund".into())),
        ..Default::default()
    };
    let patch = validate_income_update(&raw).unwrap();
    assert_eq!(
        patch.details,
        DetailsPatch::Income {
            source: SourcePatch::CustomName(Some("Refund".into()))
        }
    );
}

fn stored_income(source: IncomeSource) -> Transaction {
    Transaction::new(
        Uuid::new_v4(),
        NewTransaction {
            month_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: dec!(10),
            notes: Some("keep".into()),
            details: TransactionDetails::Income { source },
        },
    )
}

#[test]
fn test_apply_custom_name_to_other_income() {
    let mut txn = stored_income(IncomeSource::Other("Gift".into()));
    let patch = TransactionPatch {
        id: txn.id,
        date: None,
        amount: None,
        notes: None,
        details: DetailsPatch::Income {
            source: SourcePatch::CustomName(None),
        },
    };
    let errors = patch.apply_to(&mut txn).unwrap_err();
    assert_eq!(kind_of(&errors, "custom_source"), FieldErrorKind::Required);

    let patch = TransactionPatch {
        details: DetailsPatch::Income {
            source: SourcePatch::CustomName(Some("Bonus".into())),
        },
        ..patch
    };
    patch.apply_to(&mut txn).unwrap();
    assert_eq!(txn.label(), "Bonus");
    assert_eq!(txn.notes.as_deref(), Some("keep"));
}

#[test]
fn test_apply_checks_custom_name_length_only_for_other() {
    let long = "x".repeat(CUSTOM_SOURCE_MAX + 100);
    let raw = RawIncomeUpdate {
        id: Some(Uuid::new_v4().to_string()),
        custom_source: Some(Some(long.clone())),
        ..Default::default()
    };
    let patch = validate_income_update(&raw).unwrap();

    let mut salary = stored_income(IncomeSource::Salary);
    patch.apply_to(&mut salary).unwrap();
    assert_eq!(salary.label(), "Salary");

    let mut other = stored_income(IncomeSource::Other("Gift".into()));
    let errors = patch.apply_to(&mut other).unwrap_err();
    assert_eq!(kind_of(&errors, "custom_source"), FieldErrorKind::TooLong);
    assert_eq!(other.label(), "Gift");
}

#[test]
fn test_apply_custom_name_ignored_for_salary() {
    let mut txn = stored_income(IncomeSource::Salary);
    let patch = TransactionPatch {
        id: txn.id,
        date: None,
        amount: Some(dec!(20)),
        notes: Some(None),
        details: DetailsPatch::Income {
            source: SourcePatch::CustomName(Some("Bonus".into())),
        },
    };
    patch.apply_to(&mut txn).unwrap();
    assert_eq!(txn.label(), "Salary");
    assert_eq!(txn.amount, dec!(20));
    assert!(txn.notes.is_none());
}

#[test]
fn test_apply_rejects_kind_mismatch() {
    let mut txn = stored_income(IncomeSource::Salary);
    let patch = TransactionPatch {
        id: txn.id,
        date: None,
        amount: None,
        notes: None,
        details: DetailsPatch::Expense {
            item_name: Some("x".into()),
            category: None,
        },
    };
    assert!(patch.apply_to(&mut txn).is_err());
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_entries_allow_zero_and_blank() {
    let entries = validate_budget_entries(&[
        RawBudgetEntry::new("Travel", 0_i64),
        RawBudgetEntry::new("Sport", "500"),
        RawBudgetEntry::new("Dining", ""),
    ])
    .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].budget_amount, dec!(0));
    assert_eq!(entries[1].budget_amount, dec!(500));
    assert_eq!(entries[2].budget_amount, dec!(0));
}

#[test]
fn test_budget_entries_reject_negative_and_unknown() {
    let errors = validate_budget_entries(&[
        RawBudgetEntry::new("Travel", -5_i64),
        RawBudgetEntry::new("Rent", "10"),
    ])
    .unwrap_err();
    assert_eq!(kind_of(&errors, "budgets[0].budget_amount"), FieldErrorKind::InvalidAmount);
    assert_eq!(kind_of(&errors, "budgets[1].category"), FieldErrorKind::InvalidEnum);
}

// ── Months ────────────────────────────────────────────────────

#[test]
fn test_month_key_bounds() {
    assert_eq!(
        validate_month_key(2024, 3).unwrap(),
        MonthKey {
            year: 2024,
            month: 3
        }
    );
    assert!(validate_month_key(2000, 1).is_ok());
    assert!(validate_month_key(2100, 12).is_ok());

    let errors = validate_month_key(1999, 13).unwrap_err();
    assert_eq!(kind_of(&errors, "year"), FieldErrorKind::OutOfRange);
    assert_eq!(kind_of(&errors, "month"), FieldErrorKind::OutOfRange);
    assert!(validate_month_key(2101, 0).is_err());
}

#[test]
fn test_parse_month_param() {
    let key = parse_month_param("2024-07").unwrap();
    assert_eq!(key.to_string(), "2024-07");
    assert!(parse_month_param("2024-7").is_err());
    assert!(parse_month_param("2024-13").is_err());
    assert!(parse_month_param("1999-01").is_err());
    assert!(parse_month_param("July").is_err());
}

#[test]
fn test_starting_balance() {
    assert_eq!(
        validate_starting_balance(&RawNumber::from("-100")).unwrap(),
        dec!(-100)
    );
    assert!(validate_starting_balance(&RawNumber::from("x")).is_err());
    assert!(validate_starting_balance(&RawNumber::from("-100000000")).is_err());
}

#[test]
fn test_parse_id() {
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&format!(" {id} ")).unwrap(), id);

    let errors = parse_id("42").unwrap_err();
    assert_eq!(kind_of(&errors, "id"), FieldErrorKind::InvalidId);
    let errors = parse_id("").unwrap_err();
    assert_eq!(kind_of(&errors, "id"), FieldErrorKind::Required);
}
