//! 検索フィルタ
//!
//! 空文字と未設定は同じ意味。どちらもAPIのクエリパラメータには載せない。

use std::collections::BTreeMap;

/// フィールド名 → 値 のフィルタ集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeMap<String, Option<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(field.into(), Some(value.into()));
    }

    /// 値を未設定（null相当）にする
    pub fn unset(&mut self, field: &str) {
        self.entries.insert(field.to_string(), None);
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// 設定済み（空文字以外）の値
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .get(field)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 有効な値が1つも無いか
    pub fn is_unconstrained(&self) -> bool {
        self.entries.keys().all(|k| self.get(k).is_none())
    }

    /// クエリパラメータ用のペア（クリーニング済み）
    pub fn to_query(&self) -> Vec<(String, String)> {
        clean_filters(self)
            .entries
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = FilterSet::new();
        for (k, v) in iter {
            filters.set(k, v);
        }
        filters
    }
}

/// null・空文字のエントリを除いた新しいフィルタ集合を返す
///
/// 入力は変更しない
pub fn clean_filters(filters: &FilterSet) -> FilterSet {
    let entries = filters
        .entries
        .iter()
        .filter_map(|(k, v)| match v.as_deref() {
            Some(value) if !value.is_empty() => Some((k.clone(), Some(value.to_string()))),
            _ => None,
        })
        .collect();

    FilterSet { entries }
}

/// GEMSダッシュボードの入力フィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GemsFilters {
    pub ge_number: String,
    pub event_name: String,
    pub from_date: String,
    pub to_date: String,
}

impl From<&GemsFilters> for FilterSet {
    fn from(f: &GemsFilters) -> Self {
        FilterSet::new()
            .with("geNumber", f.ge_number.as_str())
            .with("eventName", f.event_name.as_str())
            .with("fromDate", f.from_date.as_str())
            .with("toDate", f.to_date.as_str())
    }
}

/// GPFダッシュボードの入力フィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpfFilters {
    pub kgid: String,
    pub from_date: String,
    pub to_date: String,
}

impl From<&GpfFilters> for FilterSet {
    fn from(f: &GpfFilters) -> Self {
        FilterSet::new()
            .with("kgid", f.kgid.as_str())
            .with("fromDate", f.from_date.as_str())
            .with("toDate", f.to_date.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_filters_drops_empty_and_null() {
        let mut filters = FilterSet::new()
            .with("kgid", "")
            .with("fromDate", "2024-01-01")
            .with("toDate", "")
            .with("name", "Ravi");
        filters.unset("name");

        let cleaned = clean_filters(&filters);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.get("fromDate"), Some("2024-01-01"));
        assert_eq!(cleaned.get("kgid"), None);
    }

    #[test]
    fn test_clean_filters_does_not_mutate_input() {
        let filters = FilterSet::new().with("kgid", "").with("toDate", "2024-02-01");
        let before = filters.clone();

        let cleaned = clean_filters(&filters);

        assert_eq!(filters, before);
        assert_eq!(filters.len(), 2);
        assert_ne!(cleaned, filters);
    }

    #[test]
    fn test_clean_filters_keeps_whitespace_values() {
        // 空文字のみ除外。空白は値として送る
        let filters = FilterSet::new().with("eventName", " ");
        assert_eq!(clean_filters(&filters).len(), 1);
    }

    #[test]
    fn test_to_query_only_sends_set_values() {
        let filters = FilterSet::from(&GpfFilters {
            kgid: String::new(),
            from_date: "2024-01-01".to_string(),
            to_date: String::new(),
        });

        assert_eq!(
            filters.to_query(),
            vec![("fromDate".to_string(), "2024-01-01".to_string())]
        );
    }

    #[test]
    fn test_gems_filters_use_api_names() {
        let filters = FilterSet::from(&GemsFilters {
            ge_number: "GE-7".to_string(),
            event_name: "Transfer".to_string(),
            ..Default::default()
        });

        assert_eq!(filters.get("geNumber"), Some("GE-7"));
        assert_eq!(filters.get("eventName"), Some("Transfer"));
        assert!(!filters.is_unconstrained());
        assert!(FilterSet::from(&GemsFilters::default()).is_unconstrained());
    }

    #[test]
    fn test_from_iter() {
        let filters: FilterSet = vec![("kgid", "1"), ("toDate", "")].into_iter().collect();
        assert_eq!(filters.to_query(), vec![("kgid".to_string(), "1".to_string())]);
    }
}
