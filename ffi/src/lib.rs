use chargen_engine::summary::render_text;
use chargen_engine::{BuildConfig, BuildError, Builder, CharacterBuildState, StepInput};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde_json::{json, Value};

fn ok(value: Value) -> Value {
    json!({ "ok": true, "result": value })
}

fn err(kind: &str, message: impl std::fmt::Display) -> Value {
    json!({ "ok": false, "kind": kind, "error": message.to_string() })
}

fn build_err(e: &BuildError) -> Value {
    err(e.kind().as_str(), e)
}

fn builder() -> Result<Builder, Value> {
    Builder::new(BuildConfig::default()).map_err(|e| err("config", format!("{e:#}")))
}

/// An empty string starts a fresh build.
fn parse_state(raw: &str) -> Result<CharacterBuildState, Value> {
    if raw.trim().is_empty() {
        return Ok(CharacterBuildState::new());
    }
    serde_json::from_str(raw).map_err(|e| err("input", format!("bad state json: {e}")))
}

fn apply_step(state_json: &str, step_json: &str) -> Value {
    let run = || -> Result<Value, Value> {
        let builder = builder()?;
        let state = parse_state(state_json)?;
        let input: StepInput = serde_json::from_str(step_json)
            .map_err(|e| err("input", format!("bad step json: {e}")))?;
        let outcome = builder.apply(&state, &input).map_err(|e| build_err(&e))?;
        serde_json::to_value(outcome).map_err(|e| err("input", e))
    };
    run().map_or_else(|e| e, ok)
}

fn summary_json(state_json: &str) -> Value {
    let run = || -> Result<Value, Value> {
        let builder = builder()?;
        let state = parse_state(state_json)?;
        let summary = builder.summary(&state).map_err(|e| build_err(&e))?;
        serde_json::to_value(summary).map_err(|e| err("input", e))
    };
    run().map_or_else(|e| e, ok)
}

fn sheet_text(state_json: &str) -> Value {
    let run = || -> Result<Value, Value> {
        let builder = builder()?;
        let state = parse_state(state_json)?;
        let summary = builder.summary(&state).map_err(|e| build_err(&e))?;
        Ok(Value::String(render_text(&summary)))
    };
    run().map_or_else(|e| e, ok)
}

/// Null when the JVM refuses the string.
fn respond(env: &mut JNIEnv, payload: Value) -> jstring {
    match env.new_string(payload.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn read(env: &mut JNIEnv, s: &JString) -> Result<String, Value> {
    env.get_string(s)
        .map(String::from)
        .map_err(|e| err("input", format!("invalid utf string: {e}")))
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_version<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    let version = concat!("chargen-ffi ", env!("CARGO_PKG_VERSION"));
    match env.new_string(version) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_applyStepJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    state_json: JString<'local>,
    step_json: JString<'local>,
) -> jstring {
    let payload = match (read(&mut env, &state_json), read(&mut env, &step_json)) {
        (Ok(state), Ok(step)) => apply_step(&state, &step),
        (Err(e), _) | (_, Err(e)) => e,
    };
    respond(&mut env, payload)
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_summaryJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    state_json: JString<'local>,
) -> jstring {
    let payload = match read(&mut env, &state_json) {
        Ok(state) => summary_json(&state),
        Err(e) => e,
    };
    respond(&mut env, payload)
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_sheetText<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    state_json: JString<'local>,
) -> jstring {
    let payload = match read(&mut env, &state_json) {
        Ok(state) => sheet_text(&state),
        Err(e) => e,
    };
    respond(&mut env, payload)
}
