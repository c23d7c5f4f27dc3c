use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

const SHEET_NAME: &str = "Market Forecast Rate Indexes";
const HEADER_ROW: u32 = 5;
const HORIZON_MONTHS: u32 = 24;

/// (path, scenario shock in percentage points)
const SCENARIOS: &[(&str, f64)] = &[
    ("Plan/ Base /Rates", 0.0),
    ("Plan/ Adverse /Rates", -1.0),
    ("Plan/ Severely Adverse /Rates", -2.5),
    ("Plan/ Rising Rates /Rates", 1.5),
];

/// (index name, starting level, long-run level)
const INDICES: &[(&str, f64, f64)] = &[
    ("SOFR", 5.30, 3.25),
    ("1M Term SOFR", 5.32, 3.30),
    ("Prime", 8.50, 6.25),
    ("10Y Treasury", 4.20, 3.90),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Exponential approach from `start` to `target` plus a scenario shock that
/// phases in over the first year.
fn forecast(start: f64, target: f64, shock: f64, month: u32, noise: f64) -> f64 {
    let t = month as f64;
    let drift = target + (start - target) * (-t / 12.0).exp();
    let phase_in = (t / 12.0).min(1.0);
    (drift + shock * phase_in + noise).max(0.0)
}

fn write_workbook(
    path: &str,
    valuation: NaiveDate,
    rate_bump: f64,
    rng: &mut SimpleRng,
) -> Result<usize> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let banner = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.write_string_with_format(0, 0, SHEET_NAME, &banner)?;
    sheet.write_string(1, 0, format!("Valuation date: {valuation}"))?;

    sheet.write_string(HEADER_ROW, 0, "Scenario Path")?;
    sheet.write_string(HEADER_ROW, 1, "Rate Index")?;
    for m in 0..HORIZON_MONTHS {
        let date = month_end(valuation + Months::new(m));
        let cell = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
        sheet.write_datetime_with_format(HEADER_ROW, 2 + m as u16, &cell, &date_format)?;
    }

    let mut row = HEADER_ROW + 1;
    for &(path, shock) in SCENARIOS {
        for &(index, start, target) in INDICES {
            sheet.write_string(row, 0, path)?;
            sheet.write_string(row, 1, index)?;
            for m in 0..HORIZON_MONTHS {
                let noise = rng.gauss(0.0, 0.03);
                let rate = forecast(start + rate_bump, target + rate_bump, shock, m, noise);
                sheet.write_number(row, 2 + m as u16, (rate * 100.0).round() / 100.0)?;
            }
            row += 1;
        }
    }

    // Subtotal row without a scenario segment; the viewer drops it.
    sheet.write_string(row, 0, "Summary")?;
    sheet.write_string(row, 1, "Average")?;

    workbook.save(path)?;
    Ok(SCENARIOS.len() * INDICES.len())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let valuation = NaiveDate::from_ymd_opt(2024, 10, 31).unwrap_or_default();

    for (path, valuation, bump) in [
        ("sample_previous.xlsx", valuation, 0.0),
        ("sample_current.xlsx", month_end(valuation + Months::new(1)), -0.15),
    ] {
        let rows = write_workbook(path, valuation, bump, &mut rng)?;
        println!("Wrote {rows} forecast rows ({HORIZON_MONTHS} months each) to {path}");
    }
    Ok(())
}
