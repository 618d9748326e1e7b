//! Gauge registry with lazy family creation.
//!
//! Families are keyed by metric name in a `DashMap` and stamped with a
//! creation sequence so rendering is deterministic: families in the order
//! they were first created, series in the order their label values were
//! first set. Values are `f64` bit patterns in `AtomicU64`, so a scrape
//! running alongside a refresh never sees a torn value.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Escape a label value.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape HELP text. Quotes are left alone.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus client libraries do:
/// shortest round-trip digits, exponents signed and at least two digits wide.
fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    } else if v == f64::INFINITY {
        return "+Inf".to_string();
    } else if v == f64::NEG_INFINITY {
        return "-Inf".to_string();
    }

    let s = format!("{v:?}");
    let Some(pos) = s.find('e') else {
        return s;
    };
    let (mantissa, exp) = (&s[..pos], &s[pos + 1..]);
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

struct Series {
    bits: AtomicU64,
    created_seq: u64,
}

/// One gauge metric name with its label schema and per-label-set values.
pub struct GaugeFamily {
    name: String,
    help: String,
    label_names: Vec<String>,
    created_seq: u64,
    series: DashMap<Vec<String>, Series>,
    seq: AtomicU64,
}

impl GaugeFamily {
    fn new(name: &str, help: &str, label_names: &[&str], created_seq: u64) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            created_seq,
            series: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Overwrite the value for one label combination, creating the series if needed.
    ///
    /// `label_values` must line up with the family's label names.
    pub fn set(&self, label_values: &[&str], value: f64) {
        debug_assert_eq!(label_values.len(), self.label_names.len());
        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();

        let series = self.series.entry(key).or_insert_with(|| Series {
            bits: AtomicU64::new(0),
            created_seq: self.seq.fetch_add(1, Ordering::Relaxed),
        });
        series.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Current value for a label combination, if it was ever set.
    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        self.series
            .get(&key)
            .map(|s| f64::from_bits(s.bits.load(Ordering::Relaxed)))
    }

    /// Number of label combinations seen so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} gauge", self.name);

        let mut rows: Vec<(u64, Vec<String>, f64)> = self
            .series
            .iter()
            .map(|r| {
                let s = r.value();
                (
                    s.created_seq,
                    r.key().clone(),
                    f64::from_bits(s.bits.load(Ordering::Relaxed)),
                )
            })
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);

        for (_, values, v) in rows {
            if self.label_names.is_empty() {
                let _ = writeln!(out, "{} {}", self.name, format_value(v));
                continue;
            }
            let label_str = self
                .label_names
                .iter()
                .zip(values.iter())
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", self.name, label_str, format_value(v));
        }
    }
}

/// Process-wide gauge registry.
///
/// Built once at startup and shared by `Arc` between the refresh loop and
/// the HTTP handlers.
#[derive(Default)]
pub struct MetricRegistry {
    families: DashMap<String, Arc<GaugeFamily>>,
    seq: AtomicU64,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            families: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Return the family named `name`, creating it on first use.
    ///
    /// Help text and label names are fixed at creation; later calls with
    /// different values get the existing family unchanged.
    pub fn get_or_create(&self, name: &str, help: &str, label_names: &[&str]) -> Arc<GaugeFamily> {
        if let Some(existing) = self.families.get(name) {
            return Arc::clone(existing.value());
        }
        let family = self.families.entry(name.to_string()).or_insert_with(|| {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            Arc::new(GaugeFamily::new(name, help, label_names, seq))
        });
        Arc::clone(family.value())
    }

    /// Shorthand for `handle.set(..)`.
    pub fn set(&self, handle: &GaugeFamily, label_values: &[&str], value: f64) {
        handle.set(label_values, value);
    }

    pub fn family(&self, name: &str) -> Option<Arc<GaugeFamily>> {
        self.families.get(name).map(|f| Arc::clone(f.value()))
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Render every family in Prometheus text exposition format (0.0.4).
    pub fn snapshot(&self) -> String {
        let mut families: Vec<Arc<GaugeFamily>> =
            self.families.iter().map(|f| Arc::clone(f.value())).collect();
        families.sort_by_key(|f| f.created_seq);

        let mut out = String::new();
        for f in families {
            f.render(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 2] = ["project_id", "region"];

    #[test]
    fn get_or_create_reuses_family() {
        let reg = MetricRegistry::new();
        let a = reg.get_or_create("gcloud_cpus_quota_limit", "first", &LABELS);
        let b = reg.get_or_create("gcloud_cpus_quota_limit", "second", &LABELS);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.help(), "first");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn set_overwrites_same_labels() {
        let reg = MetricRegistry::new();
        let g = reg.get_or_create("g", "h", &LABELS);
        g.set(&["foo", "us-east1"], 1.0);
        g.set(&["foo", "us-east1"], 2.5);
        assert_eq!(g.series_count(), 1);
        assert_eq!(g.get(&["foo", "us-east1"]), Some(2.5));
    }

    #[test]
    fn new_label_values_add_series() {
        let reg = MetricRegistry::new();
        let g = reg.get_or_create("g", "h", &LABELS);
        reg.set(&g, &["foo", "us-east1"], 1.0);
        reg.set(&g, &["foo", "global"], 2.0);
        assert_eq!(g.series_count(), 2);
        assert_eq!(g.get(&["foo", "us-east1"]), Some(1.0));
        assert_eq!(g.get(&["foo", "global"]), Some(2.0));
        assert_eq!(g.get(&["bar", "global"]), None);
    }

    #[test]
    fn snapshot_keeps_creation_order() {
        let reg = MetricRegistry::new();
        let z = reg.get_or_create("zeta", "z", &LABELS);
        let a = reg.get_or_create("alpha", "a", &LABELS);
        z.set(&["p", "r2"], 1.0);
        z.set(&["p", "r1"], 2.0);
        a.set(&["p", "r1"], 3.0);

        let expected = "\
# HELP zeta z
# TYPE zeta gauge
zeta{project_id=\"p\",region=\"r2\"} 1.0
zeta{project_id=\"p\",region=\"r1\"} 2.0
# HELP alpha a
# TYPE alpha gauge
alpha{project_id=\"p\",region=\"r1\"} 3.0
";
        assert_eq!(reg.snapshot(), expected);
    }

    #[test]
    fn unlabeled_gauge_has_no_braces() {
        let reg = MetricRegistry::new();
        let g = reg.get_or_create("last_update", "ts", &[]);
        g.set(&[], 1700000000.25);
        assert_eq!(
            reg.snapshot(),
            "# HELP last_update ts\n# TYPE last_update gauge\nlast_update 1700000000.25\n"
        );
    }

    #[test]
    fn family_without_series_renders_header_only() {
        let reg = MetricRegistry::new();
        reg.get_or_create("empty", "nothing yet", &LABELS);
        assert_eq!(reg.snapshot(), "# HELP empty nothing yet\n# TYPE empty gauge\n");
    }

    #[test]
    fn escapes_labels_and_help() {
        let reg = MetricRegistry::new();
        let g = reg.get_or_create("g", "line\\one\nline two", &LABELS);
        g.set(&["a\"b", "c\\d"], 1.0);
        let out = reg.snapshot();
        assert!(out.contains("# HELP g line\\\\one\\nline two\n"));
        assert!(out.contains("g{project_id=\"a\\\"b\",region=\"c\\\\d\"} 1.0\n"));
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(10.0), "10.0");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(-3.0), "-3.0");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn exponents_are_signed_and_padded() {
        assert_eq!(format_value(1.0 / 200000.0), "5e-06");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(1.5e-7), "1.5e-07");
        assert_eq!(format_value(-2.5e300), "-2.5e+300");
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(1760000000.5), "1760000000.5");
    }

    #[test]
    fn concurrent_scrapes_see_whole_values() {
        let reg = Arc::new(MetricRegistry::new());
        let g = reg.get_or_create("g", "h", &LABELS);
        g.set(&["p", "r"], 1.0);

        let reader = {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let out = reg.snapshot();
                    let ok = out.contains("g{project_id=\"p\",region=\"r\"} 1.0\n")
                        || out.contains("g{project_id=\"p\",region=\"r\"} 2.0\n");
                    assert!(ok, "torn or missing value: {out}");
                }
            })
        };
        for i in 0..200 {
            g.set(&["p", "r"], if i % 2 == 0 { 2.0 } else { 1.0 });
        }
        reader.join().unwrap();
    }
}
