//! Structured (JSON) rendering of a transaction's fields.
//!
//! Keys keep canonical field order; the transaction id, when known, is
//! appended as `hash`.

use serde_json::{json, Map, Value};

use super::{Field, FieldMap, FieldValue};
use crate::transaction::TransactionType;
use crate::types::{Amount, PathSet};

/// Renders fields (and optionally the transaction id) as a JSON object.
pub fn to_json(fields: &FieldMap, hash: Option<&[u8; 32]>) -> Value {
    let mut object = Map::new();
    for (field, value) in fields.iter() {
        object.insert(field.name().to_string(), field_json(field, value));
    }
    if let Some(hash) = hash {
        object.insert("hash".to_string(), Value::String(hex::encode_upper(hash)));
    }
    Value::Object(object)
}

fn field_json(field: Field, value: &FieldValue) -> Value {
    match value {
        FieldValue::UInt16(code) if field == Field::TransactionType => {
            match TransactionType::from_code(*code) {
                Some(tx_type) => Value::String(tx_type.name().to_string()),
                None => json!(code),
            }
        }
        FieldValue::UInt16(v) => json!(v),
        FieldValue::UInt32(v) => json!(v),
        FieldValue::Hash256(bytes) => Value::String(hex::encode_upper(bytes)),
        FieldValue::Blob(bytes) => Value::String(hex::encode_upper(bytes)),
        FieldValue::AccountId(account) => Value::String(account.to_address()),
        FieldValue::Amount(amount) => amount_json(amount),
        FieldValue::PathSet(paths) => path_set_json(paths),
    }
}

fn amount_json(amount: &Amount) -> Value {
    match amount {
        Amount::Native(drops) => Value::String(drops.to_string()),
        Amount::Issued(issued) => json!({
            "currency": issued.currency.to_string(),
            "issuer": issued.issuer.to_address(),
            "value": issued.value.to_string(),
        }),
    }
}

fn path_set_json(paths: &PathSet) -> Value {
    let paths = paths
        .paths()
        .iter()
        .map(|path| {
            let steps = path
                .steps()
                .iter()
                .map(|step| {
                    let mut object = Map::new();
                    if let Some(account) = &step.account {
                        object.insert("account".into(), Value::String(account.to_address()));
                    }
                    if let Some(currency) = &step.currency {
                        object.insert("currency".into(), Value::String(currency.to_string()));
                    }
                    if let Some(issuer) = &step.issuer {
                        object.insert("issuer".into(), Value::String(issuer.to_address()));
                    }
                    Value::Object(object)
                })
                .collect();
            Value::Array(steps)
        })
        .collect();
    Value::Array(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, IssuedAmount, IssuedValue};
    use crate::types::Currency;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn keys_follow_canonical_order() {
        let mut fields = FieldMap::new();
        fields
            .insert(Field::Account, FieldValue::AccountId(AccountId::from_address(GENESIS).unwrap()))
            .unwrap();
        fields.insert(Field::Fee, FieldValue::Amount(Amount::Native(10))).unwrap();
        fields.insert(Field::TransactionType, FieldValue::UInt16(20)).unwrap();

        let value = to_json(&fields, Some(&[0xAB; 32]));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["TransactionType", "Fee", "Account", "hash"]);
        assert_eq!(value["TransactionType"], "TrustSet");
        assert_eq!(value["Fee"], "10");
        assert_eq!(value["Account"], GENESIS);
        assert_eq!(value["hash"], "AB".repeat(32));
    }

    #[test]
    fn issued_amount_object() {
        let amount = Amount::Issued(IssuedAmount {
            value: IssuedValue::parse("1.5").unwrap(),
            currency: Currency::parse("USD").unwrap(),
            issuer: AccountId::from_address(GENESIS).unwrap(),
        });
        assert_eq!(
            amount_json(&amount),
            json!({"currency": "USD", "issuer": GENESIS, "value": "1.5"})
        );
    }

    #[test]
    fn paths_are_arrays_of_step_objects() {
        let set = PathSet::parse(&format!("{}=>USD/{}", GENESIS, GENESIS)).unwrap();
        assert_eq!(
            path_set_json(&set),
            json!([[{"account": GENESIS}, {"currency": "USD", "issuer": GENESIS}]])
        );
    }
}
