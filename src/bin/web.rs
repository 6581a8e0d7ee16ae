//! Single binary web server: REST API over one shared arena state.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), SNAPSHOT_PATH.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pvp_arena_web::{
    abandon_fight, abandon_fights_involving, advance_bracket, cancel_bracket_match, propose_fight,
    resolve_fight, set_bracket_winner, start_bracket, storage, Arena, BracketSide, Level, Loadout,
    PairingOptions, Policy, Role,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

/// Shared state: the single arena plus the snapshot path it mirrors to.
struct AppState {
    arena: RwLock<Arena>,
    snapshot_path: PathBuf,
}

impl AppState {
    /// Mirror the current state to disk. Write failures are logged and the
    /// request still succeeds; the in-memory state stays authoritative.
    fn mirror(&self, arena: &Arena) {
        if let Err(e) = storage::save_snapshot(&self.snapshot_path, arena) {
            log::error!("Failed to save snapshot to {}: {}", self.snapshot_path.display(), e);
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterBody {
    nickname: String,
    role: Role,
    #[serde(default)]
    loadout: Option<Loadout>,
    #[serde(default)]
    level: Level,
}

#[derive(Deserialize)]
struct SetActiveBody {
    active: bool,
}

#[derive(Deserialize, Default)]
struct SelectFightBody {
    #[serde(default)]
    policy: Policy,
    #[serde(default)]
    options: PairingOptions,
}

#[derive(Deserialize)]
struct ResolveFightBody {
    winner_id: Uuid,
}

#[derive(Deserialize)]
struct StartBracketBody {
    participant_ids: Vec<Uuid>,
    #[serde(default = "default_allow_bye")]
    allow_bye: bool,
}

fn default_allow_bye() -> bool {
    true
}

#[derive(Deserialize)]
struct BracketWinnerBody {
    match_id: Uuid,
    side: BracketSide,
}

/// Path segment: player, fight, or bracket match id.
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pvp-arena-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Full arena state (roster, queue, in-flight fights, results, bracket).
#[get("/api/arena")]
async fn api_get_arena(state: Data<AppState>) -> HttpResponse {
    let g = match state.arena.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&*g)
}

/// Register a player; they join the rotation queue immediately.
#[post("/api/players")]
async fn api_register_player(state: Data<AppState>, body: Json<RegisterBody>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let body = body.into_inner();
    match g.register(body.nickname, body.role, body.loadout, body.level) {
        Ok(_) => {
            state.mirror(&g);
            HttpResponse::Ok().json(&*g)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Remove a player; any fight they were in is abandoned unresolved.
#[delete("/api/players/{id}")]
async fn api_remove_player(state: Data<AppState>, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    abandon_fights_involving(&mut g, path.id);
    match g.remove(path.id) {
        Ok(()) => {
            state.mirror(&g);
            HttpResponse::Ok().json(&*g)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Toggle a player's activity flag; deactivating abandons their fights.
#[put("/api/players/{id}/active")]
async fn api_set_active(
    state: Data<AppState>,
    path: Path<IdPath>,
    body: Json<SetActiveBody>,
) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.set_active(path.id, body.active) {
        Ok(()) => {
            if !body.active {
                abandon_fights_involving(&mut g, path.id);
            }
            state.mirror(&g);
            HttpResponse::Ok().json(&*g)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Reset the queue from the roster: active players first, then inactive.
#[post("/api/queue/rebuild")]
async fn api_rebuild_queue(state: Data<AppState>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.rebuild_queue_from_roster();
    state.mirror(&g);
    HttpResponse::Ok().json(&*g)
}

/// Select the next fight under the given policy and record it in flight.
/// Responds with the fight, or null when fewer than two players are eligible.
#[post("/api/fights/select")]
async fn api_select_fight(state: Data<AppState>, body: Option<Json<SelectFightBody>>) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let fight = propose_fight(
        &mut g,
        body.policy,
        &body.options,
        chrono::Utc::now(),
        &mut rand::thread_rng(),
    );
    if fight.is_some() {
        state.mirror(&g);
    }
    HttpResponse::Ok().json(fight)
}

/// Resolve an in-flight fight. Duplicate resolutions (the fight already has a
/// result) are accepted as no-ops.
#[post("/api/fights/{id}/resolve")]
async fn api_resolve_fight(
    state: Data<AppState>,
    path: Path<IdPath>,
    body: Json<ResolveFightBody>,
) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let fight = match g.in_flight.iter().find(|f| f.id == path.id).cloned() {
        Some(f) => f,
        None => {
            // Already resolved (e.g. a duplicate click or another tab): no-op.
            if g.results.iter().any(|r| r.fight.id == path.id) {
                return HttpResponse::Ok().json(&*g);
            }
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No such fight" }));
        }
    };
    match resolve_fight(&mut g, &fight, body.winner_id) {
        Ok(()) => {
            state.mirror(&g);
            HttpResponse::Ok().json(&*g)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Discard an in-flight fight without a result.
#[post("/api/fights/{id}/abandon")]
async fn api_abandon_fight(state: Data<AppState>, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    abandon_fight(&mut g, path.id);
    state.mirror(&g);
    HttpResponse::Ok().json(&*g)
}

/// Start a single-elimination bracket from a participant selection.
#[post("/api/bracket/start")]
async fn api_start_bracket(state: Data<AppState>, body: Json<StartBracketBody>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match start_bracket(&mut g, &body.participant_ids, body.allow_bye, &mut rand::thread_rng()) {
        Ok(()) => HttpResponse::Ok().json(&*g),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Set the winner of a bracket match (also records the win/loss).
#[put("/api/bracket/winner")]
async fn api_bracket_winner(state: Data<AppState>, body: Json<BracketWinnerBody>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match set_bracket_winner(&mut g, body.match_id, body.side) {
        Ok(()) => {
            state.mirror(&g);
            HttpResponse::Ok().json(&*g)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Cancel an undecided bracket match (it advances nobody).
#[post("/api/bracket/{id}/cancel")]
async fn api_bracket_cancel(state: Data<AppState>, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match cancel_bracket_match(&mut g, path.id) {
        Ok(()) => HttpResponse::Ok().json(&*g),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Advance the bracket to the next round (or report completion).
#[post("/api/bracket/advance")]
async fn api_bracket_advance(state: Data<AppState>) -> HttpResponse {
    let mut g = match state.arena.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match advance_bracket(&mut g, &mut rand::thread_rng()) {
        Ok(progress) => {
            state.mirror(&g);
            let complete = matches!(progress, pvp_arena_web::BracketProgress::Complete(_));
            let champion = match &progress {
                pvp_arena_web::BracketProgress::Complete(c) => *c,
                pvp_arena_web::BracketProgress::NextRound(_) => None,
            };
            HttpResponse::Ok().json(serde_json::json!({
                "complete": complete,
                "champion": champion,
                "arena": &*g,
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Roster export as CSV: one row per player.
#[get("/api/players.csv")]
async fn api_players_csv(state: Data<AppState>) -> HttpResponse {
    let g = match state.arena.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match roster_csv(&g) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().body("export error")
        }
    }
}

fn roster_csv(arena: &Arena) -> Result<String, Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        wtr.write_record([
            "nickname", "role", "style", "weapons", "level", "active", "wins", "losses",
            "last_played",
        ])?;
        for p in &arena.players {
            let (style, weapons) = match &p.loadout {
                Some(l) => (format!("{:?}", l.style).to_lowercase(), l.weapons.join("/")),
                None => (String::new(), String::new()),
            };
            wtr.write_record([
                p.nickname.clone(),
                format!("{:?}", p.role).to_lowercase(),
                style,
                weapons,
                format!("{:?}", p.level).to_lowercase(),
                p.active.to_string(),
                p.wins.to_string(),
                p.losses.to_string(),
                p.last_played.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
    }
    Ok(String::from_utf8(buf)?)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("arena_snapshot.json")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let snapshot_path = std::env::var("SNAPSHOT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_snapshot_path());
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let arena = storage::load_snapshot(&snapshot_path);
    log::info!(
        "Loaded {} player(s), {} result(s) from {}",
        arena.players.len(),
        arena.results.len(),
        snapshot_path.display()
    );
    let state = Data::new(AppState {
        arena: RwLock::new(arena),
        snapshot_path,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_get_arena)
            .service(api_register_player)
            .service(api_remove_player)
            .service(api_set_active)
            .service(api_rebuild_queue)
            .service(api_select_fight)
            .service(api_resolve_fight)
            .service(api_abandon_fight)
            .service(api_start_bracket)
            .service(api_bracket_winner)
            .service(api_bracket_cancel)
            .service(api_bracket_advance)
            .service(api_players_csv)
    })
    .bind(bind)?
    .run()
    .await
}
