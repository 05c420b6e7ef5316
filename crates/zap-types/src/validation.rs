//! Configuration validation utilities for implementation-specific tables.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	/// A string holding an `http://` or `https://` URL.
	Url,
}

/// A field definition with name and type.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Schema definition with required and optional fields.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| mismatch("root", "table", config))?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			check_type(&field.name, value, &field.field_type)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				check_type(&field.name, value, &field.field_type)?;
			}
		}

		Ok(())
	}
}

fn mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
	ValidationError::InvalidValue {
		field: field.to_string(),
		message: message.into(),
	}
}

fn check_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "string", value))?;
		}
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(field_name, "integer", value))?;
			if let Some(min_val) = min.filter(|m| int_val < *m) {
				return Err(invalid(
					field_name,
					format!("Value {} is less than minimum {}", int_val, min_val),
				));
			}
			if let Some(max_val) = max.filter(|m| int_val > *m) {
				return Err(invalid(
					field_name,
					format!("Value {} is greater than maximum {}", int_val, max_val),
				));
			}
		}
		FieldType::Url => {
			let raw = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "url string", value))?;
			if !(raw.starts_with("http://") || raw.starts_with("https://")) {
				return Err(invalid(
					field_name,
					"URL must start with http:// or https://",
				));
			}
		}
	}

	Ok(())
}

/// A configuration schema that can validate a TOML table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
