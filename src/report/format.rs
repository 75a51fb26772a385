// ==========================================
// 化工设备报表系统 - 报表数值格式化
// ==========================================
// 规则:
// - 均值保留两位小数；空批次（均值为 None）显示 "0"
// - 明细表测量值按原值输出，整数值保留 ".0"（70.0 而非 70），指数带符号且至少两位
// ==========================================

use chrono::NaiveDateTime;

/// 空均值的显示文本
pub const EMPTY_AVERAGE_TEXT: &str = "0";

/// 汇总表均值
pub fn format_average(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => EMPTY_AVERAGE_TEXT.to_string(),
    }
}

/// 明细表测量值
///
/// 最短可往返表示，整数值带 ".0"；指数形式写作 "1e-05" / "1.5e+16"
/// （指数带符号、至少两位）
pub fn format_measurement(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// 元数据行时间戳（分钟精度）
pub fn format_render_time(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(Some(9.166666666)), "9.17");
        assert_eq!(format_average(Some(54.333333)), "54.33");
        assert_eq!(format_average(Some(0.0)), "0.00");
        assert_eq!(format_average(None), "0");
    }

    #[test]
    fn test_format_measurement() {
        assert_eq!(format_measurement(70.0), "70.0");
        assert_eq!(format_measurement(12.5), "12.5");
        assert_eq!(format_measurement(-3.25), "-3.25");
    }

    #[test]
    fn test_format_measurement_exponent_form() {
        assert_eq!(format_measurement(1e-5), "1e-05");
        assert_eq!(format_measurement(1e16), "1e+16");
        assert_eq!(format_measurement(1.5e16), "1.5e+16");
        assert_eq!(format_measurement(-2.5e-7), "-2.5e-07");
        assert_eq!(format_measurement(1e100), "1e+100");
        assert_eq!(format_measurement(0.0001), "0.0001");
        assert_eq!(format_measurement(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_format_render_time() {
        let ts = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 59)
            .unwrap();
        assert_eq!(format_render_time(&ts), "2026-03-09 07:05");
    }
}
