// 數值轉換取字串開頭最長的合法數字，其餘字元忽略 ("5400.0" -> 5400, "17.2%" -> 17.2)。
// 開頭沒有數字時回傳 0，缺漏或格式錯誤的量測值不會中斷彙總。

/// 可選的正負號之後的數字長度
fn sign_len(bytes: &[u8]) -> usize {
    matches!(bytes.first(), Some(b'+') | Some(b'-')) as usize
}

fn digits_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// 整數前綴：[+-]?[0-9]+
fn int_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = digits_len(&bytes[sign..]);
    if digits == 0 {
        return "";
    }
    &s[..sign + digits]
}

/// 浮點數前綴：[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?
fn float_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = sign_len(bytes);

    let whole = digits_len(&bytes[end..]);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_len(&bytes[end + 1..]);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }

    if whole == 0 && fraction == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_sign = sign_len(&bytes[end + 1..]);
        let exp_digits = digits_len(&bytes[end + 1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    &s[..end]
}

pub fn to_int(s: &str) -> i64 {
    int_prefix(s.trim()).parse::<i64>().unwrap_or(0)
}

pub fn to_float(s: &str) -> f64 {
    match float_prefix(s.trim()).parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
