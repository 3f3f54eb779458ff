// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::cmd::Workspace;
use crate::error::Fallible;

pub fn print_summary(directory: Option<String>) -> Fallible<()> {
    let ws = Workspace::open(directory)?;
    match ws.session.saved_summary() {
        Some(summary) => {
            println!("Answered: {}/{}", summary.answered, summary.total);
            println!("Known:    {}", summary.known);
            println!("Unknown:  {}", summary.unknown);
            println!("Score:    {:.0}%", summary.percent_known);
        }
        None => println!("No session in progress."),
    }
    Ok(())
}

pub fn reset_session(directory: Option<String>) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    let cards = ws.cards.list()?.to_vec();
    ws.session.reset(&cards)?;
    println!("Progress reset! Ready to start again.");
    Ok(())
}
