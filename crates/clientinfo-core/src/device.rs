use std::fmt;

use serde::{Deserialize, Serialize};

pub const DESKTOP_SCREEN_WIDTH: u32 = 1920;
pub const LAPTOP_SCREEN_WIDTH: u32 = 1024;
pub const MOBILE_SCREEN_WIDTH: u32 = 479;

/// Operating systems whose devices are classified as desktop or laptop.
///
/// Holds both the `detect-browser` style names and the names emitted by
/// `woothee`, so rules work whichever parser produced the OS string.
pub const DESKTOP_OS: &[&str] = &[
    "Windows 3.11",
    "Windows 95",
    "Windows 98",
    "Windows 2000",
    "Windows XP",
    "Windows Server 2003",
    "Windows Vista",
    "Windows 7",
    "Windows 8",
    "Windows 8.1",
    "Windows 10",
    "Windows ME",
    "Windows NT 4.0",
    "Windows UNKNOWN Ver",
    "Open BSD",
    "Sun OS",
    "Linux",
    "Mac OS",
    "Mac OSX",
    "QNX",
    "BeOS",
    "OS/2",
    "FreeBSD",
    "NetBSD",
    "OpenBSD",
    "Solaris",
    "Chrome OS",
    "ChromeOS",
];

/// Operating systems whose devices are classified as tablet or mobile.
pub const MOBILE_OS: &[&str] = &[
    "iOS",
    "Android OS",
    "BlackBerry OS",
    "Windows Mobile",
    "Amazon OS",
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "BlackBerry10",
    "Windows Phone OS",
    "Firefox OS",
];

/// Desktop-family OS names that always mean a laptop.
pub const LAPTOP_OS: &[&str] = &["Chrome OS", "ChromeOS"];

/// Mobile-family OS names that always mean a tablet.
pub const TABLET_OS: &[&str] = &["Amazon OS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Laptop,
    Tablet,
    Mobile,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Laptop => "laptop",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Mobile => "mobile",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-driven device classification rules.
///
/// The three width thresholds are private so they can only be set through
/// [`DeviceRules::new`], which enforces `desktop > laptop > mobile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRules {
    pub desktop_os: Vec<String>,
    pub mobile_os: Vec<String>,
    pub laptop_os: Vec<String>,
    pub tablet_os: Vec<String>,
    desktop_width: u32,
    laptop_width: u32,
    mobile_width: u32,
}

impl Default for DeviceRules {
    fn default() -> Self {
        Self {
            desktop_os: to_owned_list(DESKTOP_OS),
            mobile_os: to_owned_list(MOBILE_OS),
            laptop_os: to_owned_list(LAPTOP_OS),
            tablet_os: to_owned_list(TABLET_OS),
            desktop_width: DESKTOP_SCREEN_WIDTH,
            laptop_width: LAPTOP_SCREEN_WIDTH,
            mobile_width: MOBILE_SCREEN_WIDTH,
        }
    }
}

impl DeviceRules {
    /// Default OS lists with custom width thresholds.
    pub fn new(desktop_width: u32, laptop_width: u32, mobile_width: u32) -> Result<Self, String> {
        if !(desktop_width > laptop_width && laptop_width > mobile_width) {
            return Err(format!(
                "screen width thresholds must be strictly descending, got \
                 desktop={desktop_width} laptop={laptop_width} mobile={mobile_width}"
            ));
        }
        Ok(Self {
            desktop_width,
            laptop_width,
            mobile_width,
            ..Self::default()
        })
    }

    pub fn desktop_width(&self) -> u32 {
        self.desktop_width
    }

    pub fn laptop_width(&self) -> u32 {
        self.laptop_width
    }

    pub fn mobile_width(&self) -> u32 {
        self.mobile_width
    }

    fn is_desktop_os(&self, os: &str) -> bool {
        contains(&self.desktop_os, os)
    }

    fn is_mobile_os(&self, os: &str) -> bool {
        contains(&self.mobile_os, os)
    }
}

fn to_owned_list(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn contains(list: &[String], os: &str) -> bool {
    list.iter().any(|name| name == os)
}

/// Parse the width part of a `"WIDTHxHEIGHT"` screen string.
///
/// Mirrors numeric coercion of form input: surrounding whitespace is ignored,
/// an empty width is `0`, and anything non-numeric is NaN. NaN compares false
/// against every threshold, so such screens fall through to the narrowest
/// bucket of whichever branch applies.
pub fn parse_width(screen: &str) -> f64 {
    let raw = screen.split('x').next().unwrap_or_default().trim();
    if raw.is_empty() {
        return 0.0;
    }
    coerce_number(raw)
}

/// Number coercion of a trimmed, non-empty string: decimal literals with an
/// optional sign and exponent, signed `Infinity`, and unsigned `0b`/`0o`
/// literals. Anything else (including Rust-only spellings such as `inf` or
/// `nan`) is NaN.
fn coerce_number(raw: &str) -> f64 {
    let unsigned = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    if unsigned == "Infinity" {
        return if raw.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if let Some(digits) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        return radix_value(digits, 2);
    }
    if let Some(digits) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
        return radix_value(digits, 8);
    }
    if is_decimal_literal(unsigned) {
        return raw.parse().unwrap_or(f64::NAN);
    }
    f64::NAN
}

fn radix_value(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// `digits[.digits][(e|E)[sign]digits]`, with at least one mantissa digit.
fn is_decimal_literal(body: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int.is_empty() && frac.is_empty() {
        return false;
    }
    if !all_digits(int) || !all_digits(frac) {
        return false;
    }
    match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
        None => true,
    }
}

/// Classify a device from its screen size and OS name.
///
/// `browser` is accepted for call-site symmetry and currently unused.
/// Returns `None` when `screen` is absent or empty.
pub fn classify(
    screen: Option<&str>,
    _browser: Option<&str>,
    os: Option<&str>,
    rules: &DeviceRules,
) -> Option<DeviceClass> {
    let screen = screen.filter(|s| !s.is_empty())?;
    let width = parse_width(screen);

    let desktop = f64::from(rules.desktop_width);
    let laptop = f64::from(rules.laptop_width);
    let mobile = f64::from(rules.mobile_width);

    if let Some(os) = os {
        if rules.is_desktop_os(os) {
            if contains(&rules.laptop_os, os) || width < desktop {
                return Some(DeviceClass::Laptop);
            }
            return Some(DeviceClass::Desktop);
        }
        if rules.is_mobile_os(os) {
            if contains(&rules.tablet_os, os) || width > mobile {
                return Some(DeviceClass::Tablet);
            }
            return Some(DeviceClass::Mobile);
        }
    }

    let class = if width >= desktop {
        DeviceClass::Desktop
    } else if width >= laptop {
        DeviceClass::Laptop
    } else if width >= mobile {
        DeviceClass::Tablet
    } else {
        DeviceClass::Mobile
    };
    Some(class)
}
