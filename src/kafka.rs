//! Kafka connection options derived from [`KafkaConfig`].

// self
use crate::{_prelude::*, auth::Secret, config::KafkaConfig};

/// Connection options handed to the Kafka client at startup.
///
/// Serializes as `{ "connectionString", "groupId", "ssl"? }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaOptions {
	/// Broker connection string.
	pub connection_string: String,
	/// Consumer group identifier.
	pub group_id: String,
	/// Client TLS material; present only when both certificate and key are configured.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ssl: Option<KafkaTls>,
}
impl KafkaOptions {
	/// Builds options from configuration. TLS is included only when both the client
	/// certificate and the client key are present and non-empty.
	pub fn from_config(config: &KafkaConfig) -> Self {
		let cert = config.client_cert.as_deref().filter(|cert| !cert.is_empty());
		let key = config.client_cert_key.as_ref().map(Secret::expose).filter(|key| !key.is_empty());
		let ssl = match (cert, key) {
			(Some(cert), Some(key)) => Some(KafkaTls { cert: cert.into(), key: key.into() }),
			_ => None,
		};

		Self { connection_string: config.url.clone(), group_id: config.group_id.clone(), ssl }
	}

	/// Renders the options as librdkafka-style client properties.
	pub fn client_properties(&self) -> BTreeMap<&'static str, String> {
		let mut properties = BTreeMap::from([
			("bootstrap.servers", self.connection_string.clone()),
			("group.id", self.group_id.clone()),
		]);

		if let Some(tls) = &self.ssl {
			properties.insert("security.protocol", "ssl".into());
			properties.insert("ssl.certificate.pem", tls.cert.clone());
			properties.insert("ssl.key.pem", tls.key.clone());
		}

		properties
	}
}

/// PEM client certificate and key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaTls {
	/// PEM client certificate.
	pub cert: String,
	/// PEM client key.
	pub key: String,
}
impl Debug for KafkaTls {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KafkaTls").field("cert", &self.cert).field("key", &"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(cert: Option<&str>, key: Option<&str>) -> KafkaConfig {
		KafkaConfig {
			url: "kafka:9093".into(),
			group_id: "member-traits-processor".into(),
			client_cert: cert.map(Into::into),
			client_cert_key: key.map(Secret::new),
		}
	}

	#[test]
	fn tls_requires_both_cert_and_key() {
		let cases = [
			(None, None, false),
			(Some("C"), None, false),
			(None, Some("K"), false),
			(Some("C"), Some("K"), true),
			(Some(""), Some("K"), false),
		];

		for (cert, key, expect_tls) in cases {
			let options = KafkaOptions::from_config(&config(cert, key));

			assert_eq!(options.ssl.is_some(), expect_tls, "cert={cert:?} key={key:?}");
			assert_eq!(options.connection_string, "kafka:9093");
			assert_eq!(options.group_id, "member-traits-processor");
		}
	}

	#[test]
	fn serializes_in_client_shape() {
		let with_tls = KafkaOptions::from_config(&config(Some("C"), Some("K")));
		let without_tls = KafkaOptions::from_config(&config(None, Some("K")));

		assert_eq!(
			serde_json::to_value(&with_tls).expect("Options should serialize."),
			serde_json::json!({
				"connectionString": "kafka:9093",
				"groupId": "member-traits-processor",
				"ssl": { "cert": "C", "key": "K" },
			})
		);
		assert_eq!(
			serde_json::to_value(&without_tls).expect("Options should serialize."),
			serde_json::json!({
				"connectionString": "kafka:9093",
				"groupId": "member-traits-processor",
			})
		);
	}

	#[test]
	fn client_properties_follow_tls_presence() {
		let plain = KafkaOptions::from_config(&config(None, None)).client_properties();
		let secured = KafkaOptions::from_config(&config(Some("C"), Some("K"))).client_properties();

		assert_eq!(plain.get("bootstrap.servers").map(String::as_str), Some("kafka:9093"));
		assert!(!plain.contains_key("security.protocol"));
		assert_eq!(secured.get("security.protocol").map(String::as_str), Some("ssl"));
		assert_eq!(secured.get("ssl.key.pem").map(String::as_str), Some("K"));
	}

	#[test]
	fn tls_debug_hides_key() {
		let tls = KafkaTls { cert: "C".into(), key: "private".into() };

		assert!(!format!("{tls:?}").contains("private"));
	}
}
