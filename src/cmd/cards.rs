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

use flashdeck_core::CardId;

use crate::cmd::Workspace;
use crate::error::Fallible;

pub fn list_cards(directory: Option<String>) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    for card in ws.cards.list()? {
        println!("{card}");
    }
    Ok(())
}

pub fn add_card(directory: Option<String>, question: String, answer: String) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    let card = ws.cards.add(&question, &answer)?;
    println!("Added card #{}.", card.id());
    Ok(())
}

pub fn delete_card(directory: Option<String>, id: CardId) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    let existed = ws.cards.get(id)?.is_some();
    ws.cards.delete(id)?;
    if existed {
        println!("Deleted card #{id}.");
    } else {
        println!("No card #{id}, nothing to delete.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_add_then_delete() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        add_card(path.clone(), "Capital of Peru?".to_string(), "Lima".to_string())?;
        let mut ws = Workspace::open(path.clone())?;
        assert_eq!(ws.cards.len()?, 13);
        delete_card(path.clone(), 13)?;
        delete_card(path.clone(), 13)?;
        let mut ws = Workspace::open(path)?;
        assert_eq!(ws.cards.len()?, 12);
        Ok(())
    }

    #[test]
    fn test_add_rejects_blank_answer() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        let result = add_card(path, "Question".to_string(), "   ".to_string());
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: invalid input: answer must not be empty".to_string())
        );
        Ok(())
    }
}
