use super::*;
use crate::foundation::error::RunpaceError;

struct ListOnly(RunpaceResult<Vec<String>>);

impl CounterProvider for ListOnly {
    fn open(&self, _instance: &CpuInstance) -> RunpaceResult<Box<dyn CpuCounters>> {
        Err(RunpaceError::counter("not supported"))
    }

    fn instances(&self) -> RunpaceResult<Vec<String>> {
        match &self.0 {
            Ok(v) => Ok(v.clone()),
            Err(_) => Err(RunpaceError::counter("enumeration failed")),
        }
    }
}

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_recognizes_aggregate_sentinels() {
    assert_eq!(CpuInstance::parse("_Total"), CpuInstance::Total);
    assert_eq!(CpuInstance::parse("total"), CpuInstance::Total);
    assert_eq!(CpuInstance::parse(""), CpuInstance::Total);
    assert_eq!(CpuInstance::parse(" 3 "), CpuInstance::Core("3".to_string()));
    assert_eq!(CpuInstance::Total.to_string(), TOTAL_INSTANCE);
}

#[test]
fn display_names_for_menus() {
    assert_eq!(CpuInstance::Total.display_name(), "Total CPU");
    assert_eq!(CpuInstance::parse("2").display_name(), "CPU2");
}

#[test]
fn instances_sorted_numerically_with_sentinel_first() {
    let provider = ListOnly(Ok(ids(&["10", "2", "_Total", "0,1", "1", "x"])));
    let got = list_available_instances(&provider);
    let got: Vec<&str> = got.iter().map(CpuInstance::id).collect();
    assert_eq!(got, vec!["_Total", "1", "2", "10", "0,1", "x"]);
}

#[test]
fn instances_enumeration_failure_yields_sentinel_only() {
    let provider = ListOnly(Err(RunpaceError::counter("x")));
    assert_eq!(list_available_instances(&provider), vec![CpuInstance::Total]);
}

#[test]
fn instances_empty_enumeration_yields_sentinel_only() {
    let provider = ListOnly(Ok(vec![]));
    assert_eq!(list_available_instances(&provider), vec![CpuInstance::Total]);
}
