#!/usr/bin/env cargo
use hvac_api::openapi::HvacApiDoc;

fn main() -> anyhow::Result<()> {
    let openapi = HvacApiDoc::openapi();
    let json = serde_json::to_string_pretty(&openapi)?;

    println!("{}", json);
    Ok(())
}
