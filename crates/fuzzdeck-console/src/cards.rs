//! Agent board: one card per fleet worker.

use crate::format::format_bytes;
use crate::table::{BadgeStyle, Icon};
use crate::view::Panel;
use fuzzdeck_core::agent::Agent;
use fuzzdeck_core::ids::AgentGuid;
use fuzzdeck_core::ports::FleetApi;
use tracing::debug;

/// Rendered card for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCard {
    pub guid: AgentGuid,
    pub icon: Icon,
    pub title: String,
    pub style: BadgeStyle,
    pub endpoint: String,
    /// `free/total`.
    pub cpus: String,
    /// `free/total`, formatted from kilobytes.
    pub ram: String,
}

impl From<&Agent> for AgentCard {
    fn from(agent: &Agent) -> Self {
        let (free_cpus, cpus) = agent.cpu_capacity();
        let (free_ram, ram) = agent.ram_capacity();
        let style = if agent.is_up() {
            BadgeStyle::Primary
        } else {
            BadgeStyle::Secondary
        };
        Self {
            guid: agent.guid.clone(),
            icon: Icon::for_agent_type(agent.agent_type.as_str()),
            title: agent.description.clone(),
            style,
            endpoint: agent.endpoint.clone(),
            cpus: format!("{}/{}", free_cpus, cpus),
            ram: format!(
                "{}/{}",
                format_bytes(free_ram.saturating_mul(1000)),
                format_bytes(ram.saturating_mul(1000))
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentBoard {
    cards: Vec<AgentCard>,
    search: String,
}

impl AgentBoard {
    pub fn new(agents: &[Agent]) -> Self {
        Self {
            cards: agents.iter().map(AgentCard::from).collect(),
            search: String::new(),
        }
    }

    pub async fn load(api: &dyn FleetApi) -> Panel<AgentBoard> {
        match api.list_agents().await {
            Ok(agents) => Panel::Ready(Self::new(&agents)),
            Err(e) => {
                debug!(error = %e, "Agent board unavailable");
                Panel::Loading
            }
        }
    }

    pub fn cards(&self) -> &[AgentCard] {
        &self.cards
    }

    pub fn card(&self, guid: &AgentGuid) -> Option<&AgentCard> {
        self.cards.iter().find(|c| &c.guid == guid)
    }

    /// Drop the card for `guid`. Returns whether one was present.
    pub fn remove(&mut self, guid: &AgentGuid) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| &c.guid != guid);
        self.cards.len() != before
    }

    /// Case-insensitive match against card descriptions.
    pub fn search(&mut self, query: &str) {
        self.search = query.trim().to_lowercase();
    }

    pub fn visible(&self) -> Vec<&AgentCard> {
        self.cards
            .iter()
            .filter(|c| self.search.is_empty() || c.title.to_lowercase().contains(&self.search))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFleet, fixtures};
    use fuzzdeck_core::agent::{AgentStatus, AgentType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_card_from_agent() {
        let card = AgentCard::from(&fixtures::agent("a1", AgentStatus::Up));
        assert_eq!(card.icon, Icon::Linux);
        assert_eq!(card.style, BadgeStyle::Primary);
        assert_eq!(card.cpus, "2/4");
        assert_eq!(card.ram, "3.81 MB/7.63 MB");
    }

    #[test]
    fn test_free_capacity_never_exceeds_total() {
        let mut agent = fixtures::agent("a1", AgentStatus::Down);
        agent.free_cpus = Some(12);
        agent.free_ram = Some(9000);
        agent.agent_type = AgentType::Windows;

        let card = AgentCard::from(&agent);
        assert_eq!(card.cpus, "4/4");
        assert_eq!(card.ram, "7.63 MB/7.63 MB");
        assert_eq!(card.style, BadgeStyle::Secondary);
        assert_eq!(card.icon, Icon::Windows);
    }

    #[test]
    fn test_unreported_capacity_renders_zero() {
        let mut agent = fixtures::agent("a1", AgentStatus::Up);
        agent.cpus = None;
        agent.free_cpus = None;
        agent.ram = None;
        agent.free_ram = None;

        let card = AgentCard::from(&agent);
        assert_eq!(card.cpus, "0/0");
        assert_eq!(card.ram, "0 Bytes/0 Bytes");
    }

    #[test]
    fn test_search_and_remove() {
        let mut board = AgentBoard::new(&[
            fixtures::agent("a1", AgentStatus::Up),
            fixtures::agent("b2", AgentStatus::Up),
        ]);

        board.search("A1 WORK");
        let visible: Vec<_> = board.visible().iter().map(|c| c.guid.as_str()).collect();
        assert_eq!(visible, vec!["a1"]);

        assert!(board.remove(&AgentGuid::new("a1")));
        assert!(!board.remove(&AgentGuid::new("a1")));
        assert!(board.visible().is_empty());
        assert_eq!(board.cards().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_stays_loading() {
        let fleet = FakeFleet::new().fail_transport("GET /api/agents");
        assert!(AgentBoard::load(&fleet).await.is_loading());
    }
}
