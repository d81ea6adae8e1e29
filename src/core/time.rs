use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

// Timestamps are stored as naive UTC and rendered with a trailing Z.

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    let utc = value.assume_utc();
    utc.format(&Rfc3339).unwrap_or_else(|_| utc.to_string())
}
