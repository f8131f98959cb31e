//! §4.1.0 Overview — authcode property harness
//! - round-trip sweeps (expiry 0 / 3600), wrong-key, tamper bit-flips,
//!   expiry lapse, salt diversity, short-input boundaries
//! - deterministic splitmix64 message/key generation, fixed injected clock
//! Output: authcode_v1.log (configurable via -log)

/* =============================================================================
 * authcode — authcode_test_harness.rs — Program v4.0.0
 * Numbering: Sections §4.X.0, Subsections §4.X.Y (code-only labels)
 * =============================================================================
 */

// ============================================================================
// §4.2.0 Imports
// ============================================================================
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use authcode::wire::SALT_BYTES;
use authcode::{encode_at, try_decode_at};

/// ===========================================================================
/// §4.3.0 Params & CLI
/// ===========================================================================

/* §4.3.1 Params struct */
#[derive(Clone)]
struct Params {
    n_msgs: usize,
    max_len: usize,
    seed: u64,
    log_path: String,
}

/* §4.3.2 parse_args: CLI → Params */
fn parse_args() -> Params {
    let mut p = Params {
        n_msgs: 200,
        max_len: 512,
        seed: 0xC0DEFACE12345678u64,
        log_path: "authcode_v1.log".to_string(),
    };
    let it = env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < it.len() {
        match it[i].as_str() {
            "-msgs" if i + 1 < it.len() => {
                p.n_msgs = it[i + 1].parse().unwrap_or(p.n_msgs);
                i += 2;
            }
            "-maxlen" if i + 1 < it.len() => {
                p.max_len = it[i + 1].parse().unwrap_or(p.max_len);
                i += 2;
            }
            "-seed" if i + 1 < it.len() => {
                let s = it[i + 1].trim_start_matches("0x");
                p.seed = u64::from_str_radix(s, 16).unwrap_or(p.seed);
                i += 2;
            }
            "-log" if i + 1 < it.len() => {
                p.log_path = it[i + 1].clone();
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }
    p
}

/// ===========================================================================
/// §4.4.0 RNG (deterministic splitmix64; single-threaded-safe here)
/// ===========================================================================

/* §4.4.1 splitmix64 core */
#[inline]
fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(0x9E37_79B9_7F4A_7C15u64);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EBu64);
    z ^ (z >> 31)
}

/* §4.4.2 G_SEED + rng_seed */
static mut G_SEED: u64 = 1;
fn rng_seed(s: u64) { unsafe { G_SEED = if s == 0 { 1 } else { s }; } }

/* §4.4.3 rng_u64 */
#[allow(static_mut_refs)]
fn rng_u64() -> u64 {
    // Single-threaded harness; safe in this context.
    unsafe { splitmix64(&mut G_SEED) }
}

/* §4.4.4 rng_bytes(len) */
fn rng_bytes(len: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(len);
    while v.len() < len {
        for b in rng_u64().to_le_bytes() {
            if v.len() == len { break; }
            v.push(b);
        }
    }
    v
}

/* §4.4.5 make_key(cps) — printable ASCII 33..126 */
fn make_key(cps: usize) -> String {
    let mut s = String::with_capacity(cps);
    for _ in 0..cps {
        let c = 33u8 + (rng_u64() % 94) as u8;
        s.push(c as char);
    }
    s
}

/// ===========================================================================
/// §4.5.0 Fixed Harness Clock
/// ===========================================================================

const NOW_SECS: u64 = 1_700_000_000;
const NOW_MICROS: u64 = NOW_SECS * 1_000_000;

/// ===========================================================================
/// §4.6.0 Tests
/// ===========================================================================

/* §4.6.1 test1_round_trip: expiry 0 and 3600, random messages/keys */
fn test1_round_trip(log: &mut BufWriter<File>, p: &Params) -> Result<usize> {
    writeln!(log, "[Test 1: Round-trip]")?;
    let mut fails = 0usize;
    for i in 0..p.n_msgs {
        let msg = rng_bytes((rng_u64() as usize) % (p.max_len + 1));
        let key = make_key(8 + (rng_u64() as usize) % 56);
        for expiry in [0u64, 3600u64] {
            // per-message clock offset so salts vary across the sweep
            let token = encode_at(&msg, &key, expiry, NOW_MICROS + i as u64);
            let ok = try_decode_at(&token, &key, NOW_SECS + 1).as_deref() == Some(&msg[..]);
            if !ok {
                fails += 1;
                writeln!(log, "M{} expiry={} len={} FAIL", i, expiry, msg.len())?;
            }
        }
    }
    writeln!(log, "round_trip_fails={}", fails)?;
    Ok(fails)
}

/* §4.6.2 test2_wrong_key */
fn test2_wrong_key(log: &mut BufWriter<File>, p: &Params) -> Result<usize> {
    writeln!(log, "[Test 2: Wrong key]")?;
    let mut fails = 0usize;
    for i in 0..p.n_msgs {
        let msg = rng_bytes(1 + (rng_u64() as usize) % p.max_len.max(1));
        let key = make_key(32);
        let other = make_key(32);
        let token = encode_at(&msg, &key, 0, NOW_MICROS + i as u64);
        if try_decode_at(&token, &other, NOW_SECS).is_some() {
            fails += 1;
            writeln!(log, "M{} wrong_key_accepted FAIL", i)?;
        }
    }
    writeln!(log, "wrong_key_fails={}", fails)?;
    Ok(fails)
}

/* §4.6.3 test3_tamper: flip every body byte of a sample of tokens */
fn test3_tamper(log: &mut BufWriter<File>, p: &Params) -> Result<usize> {
    writeln!(log, "[Test 3: Tamper bit-flips]")?;
    let mut fails = 0usize;
    let samples = p.n_msgs.min(32);
    for i in 0..samples {
        let msg = rng_bytes(1 + (rng_u64() as usize) % 64);
        let key = make_key(32);
        let token = encode_at(&msg, &key, 0, NOW_MICROS + i as u64);
        let bytes = token.as_bytes();
        for pos in SALT_BYTES..bytes.len() {
            let mut mangled = bytes.to_vec();
            mangled[pos] ^= 1 << ((rng_u64() % 7) as u8);
            let mangled = String::from_utf8_lossy(&mangled).into_owned();
            if try_decode_at(&mangled, &key, NOW_SECS).is_some() {
                fails += 1;
                writeln!(log, "M{} pos={} flip_accepted FAIL", i, pos)?;
            }
        }
    }
    writeln!(log, "tamper_fails={}", fails)?;
    Ok(fails)
}

/* §4.6.4 test4_expiry: 1-second expiry, clock advanced 2 seconds */
fn test4_expiry(log: &mut BufWriter<File>, p: &Params) -> Result<usize> {
    writeln!(log, "[Test 4: Expiry lapse]")?;
    let mut fails = 0usize;
    for i in 0..p.n_msgs.min(64) {
        let msg = rng_bytes(16);
        let key = make_key(32);
        let token = encode_at(&msg, &key, 1, NOW_MICROS + i as u64);
        if try_decode_at(&token, &key, NOW_SECS).is_none() {
            fails += 1;
            writeln!(log, "M{} fresh_rejected FAIL", i)?;
        }
        if try_decode_at(&token, &key, NOW_SECS + 2).is_some() {
            fails += 1;
            writeln!(log, "M{} stale_accepted FAIL", i)?;
        }
    }
    writeln!(log, "expiry_fails={}", fails)?;
    Ok(fails)
}

/* §4.6.5 test5_salt_diversity: same message/key, advancing clock */
fn test5_salt_diversity(log: &mut BufWriter<File>, p: &Params) -> Result<usize> {
    writeln!(log, "[Test 5: Salt diversity]")?;
    let mut fails = 0usize;
    let msg = b"fixed diversity probe";
    let key = make_key(32);
    let n = p.n_msgs.min(128);
    let mut tokens = Vec::with_capacity(n);
    for i in 0..n {
        let token = encode_at(msg, &key, 0, NOW_MICROS + i as u64);
        if try_decode_at(&token, &key, NOW_SECS).as_deref() != Some(&msg[..]) {
            fails += 1;
            writeln!(log, "T{} decode FAIL", i)?;
        }
        tokens.push(token);
    }
    tokens.sort();
    let before = tokens.len();
    tokens.dedup();
    let unique = tokens.len();
    // the 4-hex-char salt space is small, so the odd collision is expected;
    // flag only wholesale repetition
    if unique < before * 3 / 4 {
        fails += before - unique;
        writeln!(log, "unique_tokens={}/{} FAIL", unique, before)?;
    } else {
        writeln!(log, "unique_tokens={}/{}", unique, before)?;
    }
    writeln!(log, "salt_diversity_fails={}", fails)?;
    Ok(fails)
}

/* §4.6.6 test6_boundaries: short and malformed inputs must come back empty */
fn test6_boundaries(log: &mut BufWriter<File>, _p: &Params) -> Result<usize> {
    writeln!(log, "[Test 6: Boundaries]")?;
    let mut fails = 0usize;
    for input in ["", "a", "ab", "abc", "abcd", "saltAAAA", "salt%%%%"] {
        if try_decode_at(input, "key", NOW_SECS).is_some() {
            fails += 1;
            writeln!(log, "input={:?} accepted FAIL", input)?;
        }
    }
    writeln!(log, "boundary_fails={}", fails)?;
    Ok(fails)
}

/// ===========================================================================
/// §4.7.0 Main
/// ===========================================================================

/* §4.7.1 main */
fn main() -> Result<()> {
    let params = parse_args();
    rng_seed(params.seed);

    let f = File::create(&params.log_path).context("open log failed")?;
    let mut log = BufWriter::new(f);

    writeln!(
        log,
        "[authcode property harness]\nmsgs={} maxlen={} seed=0x{:016X}\n",
        params.n_msgs, params.max_len, params.seed
    )?;

    let mut fails = 0usize;
    fails += test1_round_trip(&mut log, &params)?;
    fails += test2_wrong_key(&mut log, &params)?;
    fails += test3_tamper(&mut log, &params)?;
    fails += test4_expiry(&mut log, &params)?;
    fails += test5_salt_diversity(&mut log, &params)?;
    fails += test6_boundaries(&mut log, &params)?;

    writeln!(log, "\n[Done] total_fails={}", fails)?;
    log.flush()?;
    println!("Wrote {} (total_fails={})", &params.log_path, fails);
    if fails > 0 {
        anyhow::bail!("{} harness failures", fails);
    }
    Ok(())
}
