use once_cell::sync::Lazy;
use regex::Regex;

pub static STATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+-[0-9A-Za-z]+$").expect("static pattern"));

pub static TRANSMITTER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][0-9]+-[0-9]+-[0-9]+$").expect("static pattern"));

pub static RECEIVER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VR2.*-[0-9]+$").expect("static pattern"));
