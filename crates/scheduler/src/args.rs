// args.rs
// 可变参数打包：位置参数按顺序打包为序列，关键字参数按插入顺序打包为映射。
// 累积类参数每次调用都使用新容器，只有调用方显式传入同一个容器时才共享。
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认问候语
pub const DEFAULT_GREETING: &str = "Hi Merry X'Mas!";

/// 一个参数值，保留原始类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "str",
        }
    }

    /// 数值参数转为 f64，非数值返回 None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Int(i) => Some(*i as f64),
            ArgValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<i32> for ArgValue {
    fn from(i: i32) -> Self {
        ArgValue::Int(i as i64)
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        ArgValue::Float(x)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

/// 打包后的参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackedArgs {
    /// 位置参数，保持传入顺序
    pub positional: Vec<ArgValue>,
    /// 关键字参数，保持插入顺序
    pub keyword: IndexMap<String, ArgValue>,
}

impl PackedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个位置参数
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// 追加一个关键字参数，重复的关键字是非法参数
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Result<Self> {
        let key = key.into();
        if self.keyword.contains_key(&key) {
            return Err(Error::InvalidArgument(format!("关键字参数 '{}' 重复", key)));
        }
        self.keyword.insert(key, value.into());
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 位置参数的展示形式
    pub fn describe_positional(&self) -> Vec<String> {
        self.positional.iter().map(|v| v.to_string()).collect()
    }

    /// 关键字参数的展示形式，按插入顺序
    pub fn describe_keyword(&self) -> Vec<(String, String)> {
        self.keyword
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

/// 一次性打包位置参数和关键字参数
pub fn pack<P, K, S, V>(positional: P, keyword: K) -> Result<PackedArgs>
where
    P: IntoIterator,
    P::Item: Into<ArgValue>,
    K: IntoIterator<Item = (S, V)>,
    S: Into<String>,
    V: Into<ArgValue>,
{
    let mut packed = PackedArgs::new();
    for value in positional {
        packed = packed.arg(value);
    }
    for (key, value) in keyword {
        packed = packed.kwarg(key, value)?;
    }
    Ok(packed)
}

/// 用问候语拼接所有人名，问候语缺省为 [`DEFAULT_GREETING`]
pub fn greet(persons: &[&str], greeting_word: Option<&str>) -> String {
    format!("{}, {}", greeting_word.unwrap_or(DEFAULT_GREETING), persons.join(", "))
}

/// 关键字形式传入的成绩求平均值
pub fn mean_grade(grades: &PackedArgs) -> Result<f64> {
    if grades.keyword.is_empty() {
        return Err(Error::InvalidArgument("至少需要一个成绩".to_string()));
    }
    let mut total = 0.0;
    for (name, grade) in &grades.keyword {
        total += grade.as_f64().ok_or_else(|| {
            Error::InvalidArgument(format!("{} 的成绩不是数值 ({})", name, grade.type_name()))
        })?;
    }
    Ok(total / grades.keyword.len() as f64)
}

/// 追加一个分数。
///
/// `scores` 为 None 时从一个新的空列表开始，调用之间不会互相累积。
pub fn append_score(score: i64, scores: Option<Vec<i64>>) -> Vec<i64> {
    let mut scores = scores.unwrap_or_default();
    scores.push(score);
    scores
}

/// 追加到调用方持有的列表，多次传入同一个列表时结果会累积
pub fn append_score_to(score: i64, scores: &mut Vec<i64>) -> &[i64] {
    scores.push(score);
    scores
}
