//! Accessors over the loosely typed `args` and `kwargs` of a constraint.

use serde_json::{Map, Value};

/// Static configuration handed to a constraint factory.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintArgs<'a> {
	/// Registered name the constraint was looked up by.
	pub name: &'a str,
	pub args: &'a [Value],
	pub kwargs: &'a Map<String, Value>,
}

impl<'a> ConstraintArgs<'a> {
	pub fn new(name: &'a str, args: &'a [Value], kwargs: &'a Map<String, Value>) -> Self {
		Self { name, args, kwargs }
	}

	/// Non-empty string arguments. Numbers are stringified, everything
	/// falsy or structured is skipped.
	pub fn strings(&self) -> Vec<String> {
		self.args.iter().filter_map(value_to_string).collect()
	}

	pub fn kwarg(&self, key: &str) -> Option<&'a Value> {
		self.kwargs.get(key)
	}

	pub fn kwarg_bool(&self, key: &str, default: bool) -> bool {
		match self.kwarg(key) {
			Some(Value::Bool(b)) => *b,
			Some(Value::Null) | None => default,
			Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
			Some(Value::String(s)) => !s.is_empty(),
			Some(Value::Array(items)) => !items.is_empty(),
			Some(Value::Object(map)) => !map.is_empty(),
		}
	}

	/// A numeric keyword argument. `Err` means present but not a number.
	pub fn kwarg_number(&self, key: &str, default: f64) -> Result<f64, ()> {
		match self.kwarg(key) {
			None => Ok(default),
			Some(value) => value_to_number(value).ok_or(()),
		}
	}

	/// A keyword argument that is a string or list of strings.
	pub fn kwarg_strings(&self, key: &str) -> Option<Vec<String>> {
		match self.kwarg(key)? {
			Value::Array(items) => Some(items.iter().filter_map(value_to_string).collect()),
			other => Some(value_to_string(other).into_iter().collect()),
		}
	}
}

fn value_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Reads a finite number, accepting numeric strings.
pub(crate) fn value_to_number(value: &Value) -> Option<f64> {
	let number = match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	};
	number.filter(|n: &f64| n.is_finite())
}
