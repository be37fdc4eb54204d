#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use vfrfuse::config::FuseConfig;
use vfrfuse::geo::verify_checksum;

pub const OBSERVER_LAT: f64 = 49.665263;
pub const OBSERVER_LON: f64 = 9.003075;
pub const OBSERVER_ALT: i32 = 110;

/// Configuration with the observer at the reference airfield
pub fn observer_config() -> FuseConfig {
    let mut config = FuseConfig::default();
    config.fallback.latitude = OBSERVER_LAT;
    config.fallback.longitude = OBSERVER_LON;
    config.fallback.altitude = OBSERVER_ALT;
    config
}

pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 5, 14, 0, 0).unwrap()
}

/// OGN style glider report about 710 m east of the observer, 500 m above it
pub fn aprs_report(id: &str, time: &str) -> String {
    format!(
        "FLR{id}>APRS,qAS,EDFW:/{time}h4939.92N/00900.78E'090/050/A=002001 id06{id} +000fpm +0.0rot"
    )
}

pub fn sbs_report(id: &str, time: &str, altitude_ft: i32) -> String {
    format!(
        "MSG,3,1,1,{id},1,2024/06/05,{time},2024/06/05,{time},,{altitude_ft},,,49.666,9.013,,,0,0,0,0"
    )
}

/// Split an emitted byte group into sentences, checking each one
pub fn sentences(bytes: &[u8]) -> Vec<String> {
    let text = std::str::from_utf8(bytes).expect("output is ASCII");
    text.split_inclusive("\r\n")
        .map(|line| {
            assert!(line.ends_with("\r\n"), "unterminated sentence {:?}", line);
            assert!(line.starts_with('$'), "missing start delimiter {:?}", line);
            assert!(verify_checksum(line).is_ok(), "bad checksum {:?}", line);
            line.to_string()
        })
        .collect()
}

/// Comma separated fields of a sentence, checksum stripped
pub fn fields(sentence: &str) -> Vec<String> {
    sentence
        .trim_end()
        .split('*')
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect()
}
