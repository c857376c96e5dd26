//! Report Validator
//!
//! Structural check of a raw token security response before anything reads it.
//! Validation is all-or-nothing: one bad field anywhere rejects the whole report.

use serde_json::{Map, Value};
use thiserror::Error;

use super::report::{RiskReport, SUCCESS_CODE, SUCCESS_MESSAGE};

/// String fields every token entry must carry
const REQUIRED_STRINGS: &[&str] = &[
    "creator_address",
    "creator_percent",
    "holder_count",
    "honeypot_with_same_creator",
    "owner_address",
    "token_name",
    "token_symbol",
    "total_supply",
];

/// Fields that must be the string `"0"` or `"1"`
const REQUIRED_FLAGS: &[&str] = &["is_in_dex", "is_open_source"];

const HOLDER_STRINGS: &[&str] = &["address", "balance", "percent", "tag"];
const HOLDER_NUMBERS: &[&str] = &["is_contract", "is_locked"];
const LOCK_DETAIL_STRINGS: &[&str] = &["amount", "end_time", "opt_time"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportInvalid {
    #[error("Report is not a JSON object")]
    NotAnObject,

    #[error("Unexpected status code: {0}")]
    StatusCode(String),

    #[error("Unexpected status message: {0}")]
    StatusMessage(String),

    #[error("Missing field `{path}`")]
    Missing { path: String },

    #[error("Field `{path}` has wrong type, expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("Report failed to decode: {0}")]
    Decode(String),
}

/// Validate a raw report and convert it into a [`RiskReport`]
pub fn validate(raw: Value) -> Result<RiskReport, ReportInvalid> {
    check_structure(&raw)?;

    let report: RiskReport =
        serde_json::from_value(raw).map_err(|e| ReportInvalid::Decode(e.to_string()))?;
    Ok(report.normalize_keys())
}

fn check_structure(raw: &Value) -> Result<(), ReportInvalid> {
    let root = raw.as_object().ok_or(ReportInvalid::NotAnObject)?;

    match root.get("code") {
        Some(code) if code.as_i64() == Some(SUCCESS_CODE) => {}
        other => return Err(ReportInvalid::StatusCode(describe(other))),
    }
    match root.get("message") {
        Some(Value::String(message)) if message == SUCCESS_MESSAGE => {}
        other => return Err(ReportInvalid::StatusMessage(describe(other))),
    }

    let result = field(root, "", "result")?
        .as_object()
        .ok_or_else(|| wrong_type("result", "object"))?;

    for (token, entry) in result {
        let path = format!("result.{}", token);
        let entry = entry
            .as_object()
            .ok_or_else(|| wrong_type(&path, "object"))?;
        check_token_entry(entry, &path)?;
    }

    Ok(())
}

fn check_token_entry(entry: &Map<String, Value>, path: &str) -> Result<(), ReportInvalid> {
    for name in REQUIRED_STRINGS {
        require_string(entry, path, name)?;
    }

    for name in REQUIRED_FLAGS {
        let value = require_string(entry, path, name)?;
        if value != "0" && value != "1" {
            return Err(wrong_type(&join(path, name), "\"0\" or \"1\""));
        }
    }

    for (i, dex) in require_array(entry, path, "dex")?.iter().enumerate() {
        let item_path = format!("{}.dex[{}]", path, i);
        let dex = dex
            .as_object()
            .ok_or_else(|| wrong_type(&item_path, "object"))?;
        require_string(dex, &item_path, "name")?;
        require_string(dex, &item_path, "liquidity")?;
    }

    check_holders(entry, path, "holders")?;
    check_holders(entry, path, "lp_holders")?;

    Ok(())
}

fn check_holders(entry: &Map<String, Value>, path: &str, list: &str) -> Result<(), ReportInvalid> {
    for (i, holder) in require_array(entry, path, list)?.iter().enumerate() {
        let holder_path = format!("{}.{}[{}]", path, list, i);
        let holder = holder
            .as_object()
            .ok_or_else(|| wrong_type(&holder_path, "object"))?;

        for name in HOLDER_STRINGS {
            require_string(holder, &holder_path, name)?;
        }
        for name in HOLDER_NUMBERS {
            let value = field(holder, &holder_path, name)?;
            if !(value.is_i64() || value.is_u64()) {
                return Err(wrong_type(&join(&holder_path, name), "integer"));
            }
        }

        for (j, detail) in require_array(holder, &holder_path, "locked_detail")?
            .iter()
            .enumerate()
        {
            let detail_path = format!("{}.locked_detail[{}]", holder_path, j);
            let detail = detail
                .as_object()
                .ok_or_else(|| wrong_type(&detail_path, "object"))?;
            for name in LOCK_DETAIL_STRINGS {
                require_string(detail, &detail_path, name)?;
            }
        }
    }
    Ok(())
}

fn field<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<&'a Value, ReportInvalid> {
    object.get(name).ok_or_else(|| ReportInvalid::Missing {
        path: join(path, name),
    })
}

fn require_string<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<&'a str, ReportInvalid> {
    field(object, path, name)?
        .as_str()
        .ok_or_else(|| wrong_type(&join(path, name), "string"))
}

fn require_array<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<&'a Vec<Value>, ReportInvalid> {
    field(object, path, name)?
        .as_array()
        .ok_or_else(|| wrong_type(&join(path, name), "array"))
}

fn wrong_type(path: &str, expected: &'static str) -> ReportInvalid {
    ReportInvalid::WrongType {
        path: path.to_string(),
        expected,
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_string(), Value::to_string)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub const TOKEN: &str = "0x1111111111111111111111111111111111111111";

    /// Minimal structurally valid entry for one token
    pub fn entry() -> Value {
        json!({
            "creator_address": "0x2222222222222222222222222222222222222222",
            "creator_percent": "0.05",
            "dex": [{ "name": "UniswapV2", "liquidity": "15000.12", "pair": "0x3333333333333333333333333333333333333333" }],
            "holder_count": "42",
            "holders": [{
                "address": "0x4444444444444444444444444444444444444444",
                "balance": "1000",
                "is_contract": 0,
                "is_locked": 0,
                "locked_detail": [],
                "percent": "0.05",
                "tag": ""
            }],
            "honeypot_with_same_creator": "0",
            "is_in_dex": "1",
            "is_open_source": "1",
            "lp_holders": [{
                "address": "0x000000000000000000000000000000000000dead",
                "balance": "10",
                "is_contract": 0,
                "is_locked": 1,
                "locked_detail": [{ "amount": "10", "end_time": "1893456000", "opt_time": "1700000000" }],
                "percent": "0.99",
                "tag": "Null Address"
            }],
            "owner_address": "0x0000000000000000000000000000000000000000",
            "token_name": "Test",
            "token_symbol": "TST",
            "total_supply": "1000000",
            "buy_tax": "0.01",
            "sell_tax": "0.01",
            "is_mintable": "0",
            "is_honeypot": "0",
            "owner_change_balance": "0",
            "hidden_owner": "0",
            "cannot_sell_all": "0",
            "slippage_modifiable": "0",
            "transfer_pausable": "0",
            "is_proxy": "0",
            "can_take_back_ownership": "0"
        })
    }

    pub fn report_with(entry: Value) -> Value {
        json!({ "code": 1, "message": "OK", "result": { TOKEN: entry } })
    }

    pub fn report() -> Value {
        report_with(entry())
    }
}
