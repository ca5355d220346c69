//! Server-owned DSA curriculum.
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Topic {
    #[schema(value_type = String)]
    pub id: &'static str,
    #[schema(value_type = String)]
    pub name: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
}

pub static DSA_TOPICS: [Topic; 10] = [
    Topic {
        id: "arrays",
        name: "Arrays",
        description: "Learn about arrays and their operations",
    },
    Topic {
        id: "linked-lists",
        name: "Linked Lists",
        description: "Understand linked list data structures",
    },
    Topic {
        id: "stacks",
        name: "Stacks",
        description: "Master stack operations and applications",
    },
    Topic {
        id: "queues",
        name: "Queues",
        description: "Learn queue data structures",
    },
    Topic {
        id: "trees",
        name: "Trees",
        description: "Binary trees, BST, and tree traversals",
    },
    Topic {
        id: "graphs",
        name: "Graphs",
        description: "Graph representations and algorithms",
    },
    Topic {
        id: "sorting",
        name: "Sorting Algorithms",
        description: "Various sorting techniques",
    },
    Topic {
        id: "searching",
        name: "Searching Algorithms",
        description: "Binary search and more",
    },
    Topic {
        id: "dynamic-programming",
        name: "Dynamic Programming",
        description: "DP concepts and problems",
    },
    Topic {
        id: "greedy",
        name: "Greedy Algorithms",
        description: "Greedy approach to problem solving",
    },
];

pub fn is_known_topic(topic: &str) -> bool {
    DSA_TOPICS.iter().any(|known| known.id == topic)
}
