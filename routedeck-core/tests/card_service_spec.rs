use speculate2::speculate;

speculate! {
    use routedeck_core::models::*;
    use routedeck_core::{CardService, Database, Error};

    fn setup() -> (Database, CardService) {
        let db = Database::open_memory().expect("Failed to create test database");
        let cards = CardService::new(db.clone());
        (db, cards)
    }

    fn item(title: &str, path: &str) -> MenuItem {
        MenuItem {
            title: title.to_string(),
            route_path: path.to_string(),
            ..Default::default()
        }
    }

    fn ordered(title: &str, path: &str, order: i64) -> MenuItem {
        MenuItem {
            order: Some(order),
            ..item(title, path)
        }
    }

    fn create_card(
        cards: &CardService,
        title: &str,
        path: &str,
        items: Vec<MenuItem>,
    ) -> CardWithMenu {
        cards
            .create(CreateCardInput {
                title: title.to_string(),
                route_path: Some(path.to_string()),
                menu_items: Some(items),
                ..Default::default()
            })
            .expect("Failed to create card")
    }

    fn paths(card: &CardWithMenu) -> Vec<String> {
        card.menu_items.iter().map(|m| m.route_path.clone()).collect()
    }

    describe "create" {
        it "rejects a blank title without writing anything" {
            let (db, cards) = setup();
            let err = cards
                .create(CreateCardInput {
                    title: "   ".into(),
                    route_path: Some("/blog".into()),
                    ..Default::default()
                })
                .unwrap_err();

            assert!(matches!(err, Error::Validation(_)));
            assert!(cards.get_all(CardListParams::default()).unwrap().is_empty());
            assert!(db.get_all_routes().unwrap().is_empty());
        }

        it "creates an unrouted card when no path is given" {
            let (db, cards) = setup();
            let card = cards
                .create(CreateCardInput {
                    title: "Notes".into(),
                    ..Default::default()
                })
                .unwrap();

            assert!(card.card.route_id.is_none());
            assert!(card.menu_items.is_empty());
            assert!(card.requires_auth.is_none());
            assert!(db.get_all_routes().unwrap().is_empty());
        }

        it "provisions the project root and default children" {
            let (db, cards) = setup();
            let card = cards
                .create(CreateCardInput {
                    title: "Blog".into(),
                    route_path: Some("/blog".into()),
                    ..Default::default()
                })
                .unwrap();

            let root = db.get_route_by_path("/blog").unwrap().unwrap();
            assert_eq!(card.card.route_id, Some(root.id));
            assert_eq!(card.card.route_path.as_deref(), Some("/blog"));
            assert_eq!(root.project_id.as_deref(), Some(card.card.id.to_string().as_str()));
            assert_eq!(root.title.as_deref(), Some("Blog"));
            assert_eq!(root.icon.as_deref(), Some("i-carbon-folder"));
            assert_eq!(root.redirect.as_deref(), Some("/blog/home"));
            assert_eq!(paths(&card), vec!["/blog/home", "/blog/settings"]);
        }

        it "mirrors the menu items under the root" {
            let (_db, cards) = setup();
            let card = create_card(
                &cards,
                "Blog",
                "/blog",
                vec![ordered("Home", "/blog/home", 1), ordered("Archive", "/blog/archive", 2)],
            );

            assert_eq!(paths(&card), vec!["/blog/home", "/blog/archive"]);
            assert!(card.menu_items.iter().all(|m| !m.requires_auth && m.show_in_menu));
            assert_eq!(card.requires_auth, Some(false));
        }

        it "rolls back the card when a menu path is already taken" {
            let (db, cards) = setup();
            db.create_route(&CreateRouteInput {
                path: "/diary/archive".into(),
                ..Default::default()
            })
            .unwrap();
            let before = db.get_all_routes().unwrap();

            let err = cards
                .create(CreateCardInput {
                    title: "Diary".into(),
                    route_path: Some("/diary".into()),
                    menu_items: Some(vec![item("Archive", "/diary/archive")]),
                    ..Default::default()
                })
                .unwrap_err();

            assert!(matches!(err, Error::Conflict(_)));
            assert!(cards.get_all(CardListParams::default()).unwrap().is_empty());
            assert_eq!(db.get_all_routes().unwrap(), before);
        }

        it "rejects menu items that are not direct children of the project root" {
            let (db, cards) = setup();
            for path in ["/diary", "/blog", "/blog/a/b"] {
                let err = cards
                    .create(CreateCardInput {
                        title: "Blog".into(),
                        route_path: Some("/blog".into()),
                        menu_items: Some(vec![item("Home", "/blog/home"), item("Stray", path)]),
                        ..Default::default()
                    })
                    .unwrap_err();

                assert!(matches!(err, Error::Validation(ref msg) if msg.contains(path)));
            }
            assert!(cards.get_all(CardListParams::default()).unwrap().is_empty());
            assert!(db.get_all_routes().unwrap().is_empty());
        }

        it "refuses to use a child route as a project root" {
            let (db, cards) = setup();
            let blog = db
                .create_route(&CreateRouteInput {
                    path: "/blog".into(),
                    ..Default::default()
                })
                .unwrap();
            db.create_route(&CreateRouteInput {
                path: "/diary".into(),
                parent_id: Some(blog.id),
                ..Default::default()
            })
            .unwrap();

            let err = cards
                .create(CreateCardInput {
                    title: "Diary".into(),
                    route_path: Some("/diary".into()),
                    ..Default::default()
                })
                .unwrap_err();

            assert!(matches!(err, Error::Conflict(ref msg) if msg.contains("/diary")));
            assert!(cards.get_all(CardListParams::default()).unwrap().is_empty());
            assert_eq!(db.get_all_routes().unwrap().len(), 2);
        }

        it "refuses to attach to a project root another card owns" {
            let (db, cards) = setup();
            let first = create_card(&cards, "A", "/blog", vec![item("Home", "/blog/home")]);
            let before = db.get_all_routes().unwrap();

            let err = cards
                .create(CreateCardInput {
                    title: "B".into(),
                    route_path: Some("/blog".into()),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(matches!(err, Error::Conflict(_)));

            let second = cards
                .create(CreateCardInput {
                    title: "B".into(),
                    ..Default::default()
                })
                .unwrap();
            let err = cards
                .update(second.card.id, UpdateCardInput {
                    route_path: Some(Some("/blog".into())),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(matches!(err, Error::Conflict(_)));

            assert!(cards.delete(second.card.id).unwrap());
            assert_eq!(db.get_all_routes().unwrap(), before);
            let reloaded = cards.get_by_id(first.card.id).unwrap().unwrap();
            assert_eq!(reloaded.card.route_id, first.card.route_id);
            assert_eq!(paths(&reloaded), vec!["/blog/home"]);
        }

        it "adopts an untagged root and claims it" {
            let (db, cards) = setup();
            let existing = db
                .create_route(&CreateRouteInput {
                    path: "/blog".into(),
                    ..Default::default()
                })
                .unwrap();

            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);

            let root = db.get_route(existing.id).unwrap().unwrap();
            assert_eq!(card.card.route_id, Some(existing.id));
            assert_eq!(root.project_id, Some(card.card.id.to_string()));
            assert_eq!(paths(&card), vec!["/blog/home"]);
        }
    }

    describe "update" {
        it "returns None for a missing card" {
            let (_db, cards) = setup();
            assert!(cards.update(42, UpdateCardInput::default()).unwrap().is_none());
        }

        it "is a no-op when the same menu is sent twice" {
            let (db, cards) = setup();
            let items = vec![item("Home", "/blog/home"), item("Archive", "/blog/archive")];
            let card = create_card(&cards, "Blog", "/blog", items.clone());
            let before = db.get_all_routes().unwrap();

            let input = UpdateCardInput {
                route_path: Some(Some("/blog".into())),
                menu_items: Some(items),
                ..Default::default()
            };
            cards.update(card.card.id, input.clone()).unwrap();
            cards.update(card.card.id, input).unwrap();

            assert_eq!(db.get_all_routes().unwrap(), before);
        }

        it "removes children missing from the menu and keeps the ids of the rest" {
            let (db, cards) = setup();
            let card = create_card(
                &cards,
                "Blog",
                "/blog",
                vec![
                    ordered("Home", "/blog/home", 1),
                    ordered("Archive", "/blog/archive", 2),
                    ordered("Drafts", "/blog/drafts", 3),
                ],
            );
            let home_id = card.menu_items[0].id;
            let drafts_id = card.menu_items[2].id;

            let updated = cards
                .update(card.card.id, UpdateCardInput {
                    menu_items: Some(vec![
                        ordered("Home", "/blog/home", 1),
                        ordered("Drafts", "/blog/drafts", 3),
                    ]),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert_eq!(paths(&updated), vec!["/blog/home", "/blog/drafts"]);
            assert_eq!(updated.menu_items[0].id, home_id);
            assert_eq!(updated.menu_items[1].id, drafts_id);
            assert!(db.get_route_by_path("/blog/archive").unwrap().is_none());
        }

        it "clears every child when given an empty menu" {
            let (db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);

            let updated = cards
                .update(card.card.id, UpdateCardInput {
                    menu_items: Some(vec![]),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert!(updated.menu_items.is_empty());
            assert!(db.get_route_by_path("/blog").unwrap().is_some());
        }

        it "matches a stale item id by path instead" {
            let (_db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);
            let home_id = card.menu_items[0].id;

            let stale = MenuItem {
                id: Some(9_999),
                ..item("Start", "/blog/home")
            };
            let updated = cards
                .update(card.card.id, UpdateCardInput {
                    menu_items: Some(vec![stale]),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert_eq!(updated.menu_items.len(), 1);
            assert_eq!(updated.menu_items[0].id, home_id);
            assert_eq!(updated.menu_items[0].title, "Start");
        }

        it "orders the menu by order then creation" {
            let (_db, cards) = setup();
            let card = create_card(
                &cards,
                "Blog",
                "/blog",
                vec![
                    ordered("A", "/blog/a", 2),
                    ordered("B", "/blog/b", 1),
                    ordered("C", "/blog/c", 1),
                ],
            );

            assert_eq!(paths(&card), vec!["/blog/b", "/blog/c", "/blog/a"]);
        }

        it "moves the routes to a new project" {
            let (db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);

            let moved = cards
                .update(card.card.id, UpdateCardInput {
                    route_path: Some(Some("/diary".into())),
                    menu_items: Some(vec![
                        ordered("Home", "/diary/home", 1),
                        ordered("Archive", "/diary/archive", 2),
                    ]),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            let root = db.get_route_by_path("/diary").unwrap().unwrap();
            assert_eq!(moved.card.route_id, Some(root.id));
            assert_eq!(moved.card.route_path.as_deref(), Some("/diary"));
            assert_eq!(paths(&moved), vec!["/diary/home", "/diary/archive"]);

            let owner = card.card.id.to_string();
            let owned: Vec<String> = db
                .get_routes_by_project(&owner)
                .unwrap()
                .into_iter()
                .map(|r| r.path)
                .collect();
            assert!(owned.iter().all(|p| p.starts_with("/diary")));
            assert_eq!(owned.len(), 3);
        }

        it "detaches the card when the path is set to null" {
            let (db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);

            let detached = cards
                .update(card.card.id, UpdateCardInput {
                    route_path: Some(None),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert!(detached.card.route_id.is_none());
            assert!(detached.card.route_path.is_none());
            assert!(detached.menu_items.is_empty());
            assert!(db.get_all_routes().unwrap().is_empty());
        }

        it "only touches the supplied root fields when no menu is sent" {
            let (db, cards) = setup();
            let card = cards
                .create(CreateCardInput {
                    title: "Blog".into(),
                    route_path: Some("/blog".into()),
                    redirect: Some("/blog/archive".into()),
                    order: Some(5),
                    menu_items: Some(vec![item("Home", "/blog/home")]),
                    ..Default::default()
                })
                .unwrap();

            let updated = cards
                .update(card.card.id, UpdateCardInput {
                    requires_auth: Some(true),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            let root = db.get_route_by_path("/blog").unwrap().unwrap();
            assert!(root.requires_auth);
            assert_eq!(root.redirect.as_deref(), Some("/blog/archive"));
            assert_eq!(root.order, 5);
            assert!(root.show_in_menu);
            assert_eq!(updated.menu_items.len(), 1);
        }

        it "keeps the root title in step with the card title" {
            let (db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![]);

            cards
                .update(card.card.id, UpdateCardInput {
                    title: Some("Journal".into()),
                    ..Default::default()
                })
                .unwrap();

            let root = db.get_route_by_path("/blog").unwrap().unwrap();
            assert_eq!(root.title.as_deref(), Some("Journal"));
        }

        it "leaves card and routes untouched when a menu item is invalid" {
            let (db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![item("Home", "/blog/home")]);
            let routes_before = db.get_all_routes().unwrap();

            let err = cards
                .update(card.card.id, UpdateCardInput {
                    title: Some("Renamed".into()),
                    menu_items: Some(vec![
                        item("Archive", "/blog/archive"),
                        item("Bad", "bad-path"),
                    ]),
                    ..Default::default()
                })
                .unwrap_err();

            assert!(matches!(err, Error::Validation(ref msg) if msg.contains("bad-path")));
            assert_eq!(db.get_all_routes().unwrap(), routes_before);
            let reloaded = cards.get_by_id(card.card.id).unwrap().unwrap();
            assert_eq!(reloaded.card.title, "Blog");
        }
    }

    describe "delete" {
        it "removes every route the card owns" {
            let (db, cards) = setup();
            db.seed_base_routes().unwrap();
            let card = create_card(
                &cards,
                "Blog",
                "/blog",
                vec![item("Home", "/blog/home"), item("Archive", "/blog/archive")],
            );

            assert!(cards.delete(card.card.id).unwrap());

            assert!(db.get_routes_by_project(&card.card.id.to_string()).unwrap().is_empty());
            assert!(cards.get_by_id(card.card.id).unwrap().is_none());
            assert_eq!(db.get_all_routes().unwrap().len(), 2);
        }

        it "returns false for a missing card" {
            let (_db, cards) = setup();
            assert!(!cards.delete(7).unwrap());
        }
    }

    describe "reads" {
        it "lists newest cards first with paging" {
            let (_db, cards) = setup();
            for title in ["One", "Two", "Three"] {
                cards
                    .create(CreateCardInput {
                        title: title.into(),
                        ..Default::default()
                    })
                    .unwrap();
            }

            let page = cards.get_all(CardListParams { limit: 2, offset: 0 }).unwrap();
            let titles: Vec<&str> = page.iter().map(|c| c.card.title.as_str()).collect();
            assert_eq!(titles, vec!["Three", "Two"]);

            let rest = cards.get_all(CardListParams { limit: 2, offset: 2 }).unwrap();
            assert_eq!(rest.len(), 1);
            assert_eq!(rest[0].card.title, "One");
        }

        it "records clicks" {
            let (_db, cards) = setup();
            let card = create_card(&cards, "Blog", "/blog", vec![]);
            assert!(card.card.last_clicked_at.is_none());

            let clicked = cards.record_click(card.card.id).unwrap().unwrap();
            assert!(clicked.card.last_clicked_at.is_some());
            assert!(cards.record_click(999).unwrap().is_none());
        }
    }
}
