use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Deserialize;

use wordlm_core::io::{list_files, normalize_folder};
use wordlm_core::{
	Decoding, Error, FrequencyModel, FrequencyTrainer, GenerationInput, LanguageModel, TokenizerConfig, UnknownPolicy,
};

/// Environment variable overriding the corpus folder.
const ENV_DATA_DIR: &str = "WORDLM_DATA_DIR";
/// Environment variable overriding the listen address.
const ENV_BIND: &str = "WORDLM_BIND";

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String>,
	n_words: Option<usize>,
	decoding: Option<String>, // "argmax" or "sample:<u64>"
	skip_unknown: Option<bool>,
}

#[derive(Deserialize)]
struct TrainQuery {
	name: Option<String>,
}

struct SharedData {
	data_dir: PathBuf,
	model: Option<LanguageModel<FrequencyModel>>,
}

impl GenerateParams {
	/// Builds the generation input, defaulting to 4 argmax words.
	fn input(&self) -> Result<GenerationInput, Error> {
		let seed = match &self.seed {
			Some(s) if !s.trim().is_empty() => s.trim(),
			_ => return Err(Error::InvalidInput("seed cannot be empty".to_owned())),
		};

		let mut input = GenerationInput::new(seed, self.n_words.unwrap_or(4))?;
		if let Some(decoding) = &self.decoding {
			input.decoding = decoding.parse::<Decoding>()?;
		}
		if self.skip_unknown.unwrap_or(false) {
			input.policy = UnknownPolicy::Skip;
		}
		Ok(input)
	}
}

/// Maps pipeline errors to a response: caller mistakes are 400, the rest 500.
fn error_response(e: Error) -> HttpResponse {
	match e {
		Error::UnknownWord(_) | Error::UnmappedId(_) | Error::InvalidInput(_) | Error::EmptyDataset => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		_ => {
			error!("Request failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Continues `seed` with `n_words` words using the loaded model.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.input() {
		Ok(input) => input,
		Err(e) => return error_response(e),
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match &shared_data.model {
		Some(model) => model,
		None => return HttpResponse::Conflict().body("No model trained, call /v1/train first"),
	};

	match model.generate(&input) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(e),
	}
}

/// Lists the corpora (`*.txt`) available for training.
#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// Vocabulary size and context length of the loaded model.
#[get("/v1/vocabulary")]
async fn get_vocabulary(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(format!(
			"vocab_size: {}\ncontext_len: {}",
			model.vocabulary().size(),
			model.context_len()
		)),
		None => HttpResponse::Conflict().body("No model trained"),
	}
}

/// Trains (or loads the cached model of) `<data_dir>/<name>.txt`.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};
	if name.contains(['/', '\\']) || name.starts_with('.') {
		return HttpResponse::BadRequest().body("Invalid corpus name");
	}

	let corpus_path = shared_data.data_dir.join(format!("{name}.txt"));
	if !corpus_path.is_file() {
		return HttpResponse::NotFound().body(format!("Corpus {name} not found"));
	}

	let trainer = FrequencyTrainer::default();
	match LanguageModel::from_file(&corpus_path, &trainer, TokenizerConfig::default()) {
		Ok((model, report)) => {
			shared_data.model = Some(model);
			match report {
				Some(report) => HttpResponse::Ok().body(report.to_string()),
				None => HttpResponse::Ok().body("Model loaded from cache"),
			}
		}
		Err(e) => error_response(e),
	}
}

/// Main entry point for the server.
///
/// Starts without a model; `PUT /v1/train?name=<corpus>` installs one.
///
/// # Notes
/// - Binds to `WORDLM_BIND` (default `127.0.0.1:5000`).
/// - Corpora are read from `WORDLM_DATA_DIR` (default `./data`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let data_dir = normalize_folder(&std::env::var(ENV_DATA_DIR).unwrap_or_else(|_| "./data".to_owned()));
	let bind = std::env::var(ENV_BIND).unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	info!("Serving corpora from {} on {}", data_dir.display(), bind);

	let shared_data = SharedData { data_dir, model: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(get_vocabulary)
			.service(put_train)
	})
		.bind(bind)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test as actix_test;

	fn params(seed: Option<&str>, decoding: Option<&str>) -> GenerateParams {
		GenerateParams {
			seed: seed.map(str::to_owned),
			n_words: None,
			decoding: decoding.map(str::to_owned),
			skip_unknown: Some(true),
		}
	}

	#[test]
	fn query_defaults_to_four_argmax_words() {
		let input = params(Some(" or to "), None).input().unwrap();
		assert_eq!(input.seed_text, "or to");
		assert_eq!(input.n_words(), 4);
		assert_eq!(input.decoding, Decoding::Argmax);
		assert_eq!(input.policy, UnknownPolicy::Skip);
	}

	#[test]
	fn bad_queries_are_rejected() {
		assert!(params(None, None).input().is_err());
		assert!(params(Some("  "), None).input().is_err());
		assert!(params(Some("a"), Some("beam")).input().is_err());
	}

	#[actix_web::test]
	async fn train_then_generate() {
		let dir = std::env::temp_dir().join(format!("wordlm-server-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		std::fs::write(dir.join("rhyme.txt"), "jack and jill went up the hill\nto fetch a pail of water").unwrap();

		let shared = web::Data::new(Mutex::new(SharedData { data_dir: dir.clone(), model: None }));
		let app = actix_test::init_service(
			App::new()
				.app_data(shared.clone())
				.service(get_generated)
				.service(get_corpora)
				.service(get_vocabulary)
				.service(put_train),
		)
		.await;

		let req = actix_test::TestRequest::get().uri("/v1/generate?seed=jack").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

		let req = actix_test::TestRequest::get().uri("/v1/corpora").to_request();
		assert_eq!(actix_test::call_and_read_body(&app, req).await, "rhyme");

		let req = actix_test::TestRequest::put().uri("/v1/train?name=rhyme").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = actix_test::TestRequest::get().uri("/v1/generate?seed=jack%20and&n_words=2").to_request();
		assert_eq!(actix_test::call_and_read_body(&app, req).await, "jack and jill went");

		let req = actix_test::TestRequest::get().uri("/v1/generate?seed=humpty").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = actix_test::TestRequest::put().uri("/v1/train?name=../etc").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		std::fs::remove_dir_all(&dir).unwrap();
	}
}
