//! Driver hand-off: bind [`Value`] directly as a tokio-postgres parameter.

use super::Value;
use bytes::{BufMut, BytesMut};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;

fn wrong_type(ty: &Type) -> Result<IsNull, BoxError> {
    Err(Box::new(WrongType::new::<Value>(ty.clone())))
}

/// Binary NUMERIC: base-10000 digits, most significant first, no scale.
fn write_numeric(i: i64, out: &mut BytesMut) {
    let mut n = i.unsigned_abs();
    let mut digits = Vec::new();
    while n > 0 {
        digits.push((n % 10_000) as i16);
        n /= 10_000;
    }
    let weight = digits.len().saturating_sub(1) as i16;
    digits.reverse();
    while digits.last() == Some(&0) {
        digits.pop();
    }

    out.put_i16(digits.len() as i16);
    out.put_i16(weight);
    out.put_u16(if i < 0 { NUMERIC_NEG } else { NUMERIC_POS });
    out.put_u16(0);
    for d in digits {
        out.put_i16(d);
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => {
                    write_numeric(*i, out);
                    Ok(IsNull::No)
                }
                _ => wrong_type(ty),
            },
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Type::FLOAT8 => x.to_sql(ty, out),
                _ => wrong_type(ty),
            },
            Value::Text(s) => match *ty {
                // `?::jsonb` parameters arrive typed as JSON; the text must be a document.
                Type::JSON | Type::JSONB => {
                    let doc: serde_json::Value = serde_json::from_str(s)?;
                    doc.to_sql(ty, out)
                }
                _ if <String as ToSql>::accepts(ty) => s.to_sql(ty, out),
                _ => wrong_type(ty),
            },
            Value::Bytes(b) if *ty == Type::BYTEA => b.to_sql(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
                Type::TIMESTAMPTZ => ts.to_sql(ty, out),
                _ => wrong_type(ty),
            },
            _ => wrong_type(ty),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <Vec<u8> as ToSql>::accepts(ty)
            || <chrono::DateTime<chrono::Utc> as ToSql>::accepts(ty)
            || <chrono::NaiveDateTime as ToSql>::accepts(ty)
            || matches!(*ty, Type::NUMERIC | Type::JSON | Type::JSONB)
    }

    to_sql_checked!();
}
