use base64::{
	alphabet,
	engine::{self, general_purpose},
	Engine,
};
use uuid::Uuid;

pub const CUSTOM_ENGINE: engine::GeneralPurpose = engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);

/// Fresh document id: a random v4 uuid, encoded as 22 url-safe characters.
pub fn new_id() -> String {
	CUSTOM_ENGINE.encode(Uuid::new_v4().as_bytes())
}
